use std::sync::Arc;

use eyre::{eyre, Result};

use gblock_core_rs::loc::ExonMap;

use crate::config::Config;
use crate::pair::GuidePair;
use crate::pipeline;
use crate::rank;
use crate::site::TargetSite;
use crate::synthesis::PairSynthesizer;

/// Designs ranked guide pairs for a single gene.
///
/// ```ignore
/// let pairs = GuideDesigner::new(config).with_exons(exons).design(sites)?;
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct GuideDesigner {
    config: Config,
    exons: Option<ExonMap>,
}

impl GuideDesigner {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            exons: None,
        }
    }

    pub fn with_exons(mut self, exons: ExonMap) -> Self {
        self.exons = Some(exons);
        self
    }

    pub fn set_exons(&mut self, exons: ExonMap) -> &mut Self {
        self.exons = Some(exons);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn exons(&self) -> Option<&ExonMap> {
        self.exons.as_ref()
    }

    fn require_exons(&self) -> Result<&ExonMap> {
        match &self.exons {
            Some(exons) => Ok(exons),
            None => {
                log::error!("Exon structure of the gene wasn't provided");
                Err(eyre!("Can't design guide pairs without the gene's exon structure"))
            }
        }
    }

    /// Filters and orders candidate sites, see [`pipeline::prepare`].
    pub fn prepare(&self, sites: Vec<TargetSite>) -> Result<Vec<Arc<TargetSite>>> {
        self.config.validate()?;
        pipeline::prepare(sites, self.require_exons()?, &self.config)
    }

    /// Runs the whole design: candidate filtering, pair synthesis, and ranking.
    pub fn design(&self, sites: Vec<TargetSite>) -> Result<Vec<GuidePair>> {
        let prepared = self.prepare(sites)?;
        let exons = self.require_exons()?;

        let mut pairs = PairSynthesizer::new(&self.config).run(&prepared, Some(exons))?;
        rank::rank(&mut pairs, *self.config.sort_key(), exons.strand());
        Ok(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rank::SortKey;
    use gblock_core_rs::loc::{Position, Strand};

    const SEQ: &str = "GACGTACGTACGTACGTACGAGG";

    fn site(cut: Position, off_targets: [u32; 4]) -> TargetSite {
        TargetSite::new(SEQ, cut - 19, 1, Strand::Forward, off_targets).unwrap()
    }

    fn config(sort_key: SortKey) -> Config {
        let mut builder = Config::builder();
        builder.set_sort_key(sort_key).set_latest_fraction(1.0).unwrap();
        builder.build()
    }

    #[test]
    fn test_design() {
        let exons = ExonMap::from_bounds([(0, 99), (200, 299)], Strand::Forward).unwrap();
        let sites = vec![
            site(250, [0; 4]),
            site(50, [0; 4]),
            site(260, [0, 0, 0, 1]),
            site(20, [0; 4]),
            // Intronic
            site(150, [0; 4]),
        ];

        let pairs = GuideDesigner::new(config(SortKey::DeletionCount))
            .with_exons(exons)
            .design(sites)
            .unwrap();
        let cuts: Vec<_> = pairs
            .iter()
            .map(|x| (x.upstream().cut_site(), x.downstream().cut_site()))
            .collect();
        // Deletions: 79 + 51 = 130, 49 + 51 = 100, 30
        assert_eq!(cuts, [(20, 250), (50, 250), (20, 50)]);
    }

    #[test]
    fn test_design_requires_exons() {
        let designer = GuideDesigner::new(Config::default());
        assert!(designer.exons().is_none());
        assert!(designer.design(vec![site(50, [0; 4])]).is_err());
    }

    #[test]
    fn test_design_is_idempotent() {
        let exons = ExonMap::from_bounds([(0, 999)], Strand::Reverse).unwrap();
        let sites: Vec<_> = [100, 180, 260, 330, 500]
            .into_iter()
            .map(|x| site(x, [0; 4]))
            .collect();

        let mut designer = GuideDesigner::new(config(SortKey::Separation));
        designer.set_exons(exons);
        let first = designer.design(sites.clone()).unwrap();
        let second = designer.design(sites).unwrap();
        assert!(!first.is_empty());
        assert_eq!(first, second);
        assert!(first
            .windows(2)
            .all(|x| x[0].separation() <= x[1].separation()));
    }
}
