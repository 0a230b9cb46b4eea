use derive_getters::Getters;
use eyre::{ensure, Result};

use crate::rank::SortKey;

/// Parameters of a single guide-pair design run. Immutable once built: use [`ConfigBuilder`] to
/// override the defaults.
#[derive(Clone, PartialEq, Debug, Getters)]
pub struct Config {
    // Candidate filtering
    max_off_targets: [u32; 4],
    // Pairing
    require_downstream_g_start: bool,
    separation_limit: u64,
    latest_fraction: f64,
    min_exon_deletion: u64,
    // Ranking
    sort_key: SortKey,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_off_targets: [0, 0, 0, 0],
            require_downstream_g_start: true,
            separation_limit: 10_000,
            latest_fraction: 0.5,
            min_exon_deletion: 0,
            sort_key: SortKey::default(),
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Checks the invariants enforced by the builder.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.separation_limit > 0,
            "Separation limit must be greater than 0"
        );
        ensure!(
            (0.0..=1.0).contains(&self.latest_fraction),
            "Latest gene location fraction must be within [0, 1], got {}",
            self.latest_fraction
        );
        Ok(())
    }
}

/// Collects caller-provided values and merges them over [`Config::default`].
#[derive(Clone, PartialEq, Debug, Default)]
pub struct ConfigBuilder {
    max_off_targets: Option<[u32; 4]>,
    require_downstream_g_start: Option<bool>,
    separation_limit: Option<u64>,
    latest_fraction: Option<f64>,
    min_exon_deletion: Option<u64>,
    sort_key: Option<SortKey>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_max_off_targets(&mut self, max_off_targets: [u32; 4]) -> &mut Self {
        self.max_off_targets = Some(max_off_targets);
        self
    }

    pub fn set_require_downstream_g_start(&mut self, require: bool) -> &mut Self {
        self.require_downstream_g_start = Some(require);
        self
    }

    pub fn set_separation_limit(&mut self, separation_limit: u64) -> Result<&mut Self> {
        ensure!(
            separation_limit > 0,
            "Separation limit must be greater than 0"
        );
        self.separation_limit = Some(separation_limit);
        Ok(self)
    }

    pub fn set_latest_fraction(&mut self, latest_fraction: f64) -> Result<&mut Self> {
        ensure!(
            (0.0..=1.0).contains(&latest_fraction),
            "Latest gene location fraction must be within [0, 1], got {latest_fraction}"
        );
        self.latest_fraction = Some(latest_fraction);
        Ok(self)
    }

    pub fn set_min_exon_deletion(&mut self, min_exon_deletion: u64) -> &mut Self {
        self.min_exon_deletion = Some(min_exon_deletion);
        self
    }

    pub fn set_sort_key(&mut self, sort_key: SortKey) -> &mut Self {
        self.sort_key = Some(sort_key);
        self
    }

    pub fn build(&self) -> Config {
        let default = Config::default();
        Config {
            max_off_targets: self.max_off_targets.unwrap_or(default.max_off_targets),
            require_downstream_g_start: self
                .require_downstream_g_start
                .unwrap_or(default.require_downstream_g_start),
            separation_limit: self.separation_limit.unwrap_or(default.separation_limit),
            latest_fraction: self.latest_fraction.unwrap_or(default.latest_fraction),
            min_exon_deletion: self.min_exon_deletion.unwrap_or(default.min_exon_deletion),
            sort_key: self.sort_key.unwrap_or(default.sort_key),
        }
    }
}
