use std::sync::Arc;

use eyre::{ensure, eyre, Result};

use gblock_core_rs::loc::ExonMap;

use crate::config::Config;
use crate::pair::GuidePair;
use crate::site::TargetSite;

// Upstream candidates seen so far. Only `sites[head..]` is live: everything before `head` was
// evicted and is never looked at again.
#[derive(Default)]
struct Window {
    sites: Vec<Arc<TargetSite>>,
    head: usize,
}

impl Window {
    fn live(&self) -> std::ops::Range<usize> {
        self.head..self.sites.len()
    }

    fn evict_through(&mut self, ind: usize) {
        self.head = self.head.max(ind + 1);
    }
}

/// Sliding-window pairing of target sites ordered in transcription order.
#[derive(Clone, PartialEq, Debug)]
pub struct PairSynthesizer {
    separation_limit: u64,
    require_downstream_g_start: bool,
    latest_fraction: f64,
    min_exon_deletion: u64,
}

impl PairSynthesizer {
    pub fn new(config: &Config) -> Self {
        Self {
            separation_limit: *config.separation_limit(),
            require_downstream_g_start: *config.require_downstream_g_start(),
            latest_fraction: *config.latest_fraction(),
            min_exon_deletion: *config.min_exon_deletion(),
        }
    }

    /// Pairs every site with the upstream candidates within the separation limit.
    ///
    /// Sites must already be ordered by cut site in transcription order. Pairs are returned in
    /// discovery order. The pass stops after the first site located past the latest allowed
    /// gene location fraction.
    pub fn run(
        &self,
        sites: &[Arc<TargetSite>],
        exons: Option<&ExonMap>,
    ) -> Result<Vec<GuidePair>> {
        let exons = match exons {
            Some(exons) => exons,
            None => {
                log::error!("Can't pair target sites without the gene's exon structure");
                return Err(eyre!("Exon structure is required to pair target sites"));
            }
        };
        ensure!(
            !exons.is_empty(),
            "Can't pair target sites: the exon map is empty"
        );

        let mut window = Window::default();
        let mut pairs = Vec::new();

        for site in sites {
            let downstream = if self.require_downstream_g_start {
                site.find_start_variants()
            } else {
                vec![Arc::clone(site)]
            };

            for ind in window.live() {
                let candidate = &window.sites[ind];
                if candidate.cut_site().abs_diff(site.cut_site()) > self.separation_limit {
                    window.evict_through(ind);
                    continue;
                }
                if candidate.overlaps(site) {
                    continue;
                }

                for variant in &downstream {
                    let pair =
                        GuidePair::new(Arc::clone(candidate), Arc::clone(variant), Some(exons))?;
                    let deleted = pair.deletion_count().and_then(|x| u64::try_from(x).ok());
                    if deleted.is_some_and(|x| x >= self.min_exon_deletion) {
                        pairs.push(pair);
                    }
                }
            }

            window.sites.extend(site.find_start_variants());

            let fraction = match site.gene_location_fraction() {
                Some(fraction) => fraction,
                None => exons.fraction_at(site.cut_site())?,
            };
            if fraction > self.latest_fraction {
                log::debug!(
                    "Stopping at {site}: gene location fraction {fraction:.3} is past {}",
                    self.latest_fraction
                );
                break;
            }
        }

        log::info!("Synthesized {} guide pairs", pairs.len());
        Ok(pairs)
    }
}
