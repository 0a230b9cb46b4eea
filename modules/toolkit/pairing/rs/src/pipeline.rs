//! Filtering and ordering of candidate target sites before pairing.
//!
//! Every stage consumes its input and returns a new collection.

use std::sync::Arc;

use eyre::Result;

use gblock_core_rs::loc::{ExonMap, Strand};

use crate::config::Config;
use crate::site::TargetSite;

/// Keeps sites whose off-target count in every mismatch bucket is within the given maximum.
/// `max_off_targets` must have exactly one entry per bucket (0-3 mismatches), otherwise the
/// sites are returned unfiltered.
pub fn filter_by_off_targets(sites: Vec<TargetSite>, max_off_targets: &[u32]) -> Vec<TargetSite> {
    if max_off_targets.len() != 4 {
        log::warn!(
            "Can't filter target sites: expected 4 off-target limits, got {}",
            max_off_targets.len()
        );
        return sites;
    }

    sites
        .into_iter()
        .filter(|site| {
            site.off_targets()
                .iter()
                .zip(max_off_targets)
                .all(|(count, max)| count <= max)
        })
        .collect()
}

/// Keeps sites that cut inside a coding exon.
pub fn filter_by_exon_containment(sites: Vec<TargetSite>, exons: &ExonMap) -> Vec<TargetSite> {
    sites
        .into_iter()
        .filter(|site| site.cut_in_range(exons))
        .collect()
}

/// Assigns the gene location fraction to every site. Sites must cut inside an exon.
pub fn assign_gene_location_fractions(
    sites: Vec<TargetSite>,
    exons: &ExonMap,
) -> Result<Vec<TargetSite>> {
    sites
        .into_iter()
        .map(|mut site| {
            site.set_gene_location_fraction(exons)?;
            Ok(site)
        })
        .collect()
}

/// Orders sites by cut site in the gene's transcription order: ascending for forward-strand
/// genes, descending for reverse-strand genes. The sort is stable.
pub fn order_by_cut_site(mut sites: Vec<TargetSite>, strand: Strand) -> Vec<TargetSite> {
    sites.sort_by_key(|site| site.cut_site() * strand.sign());
    sites
}

/// Runs all stages in order and hands out shared sites ready for pairing.
pub fn prepare(
    sites: Vec<TargetSite>,
    exons: &ExonMap,
    config: &Config,
) -> Result<Vec<Arc<TargetSite>>> {
    let total = sites.len();

    let specific = filter_by_off_targets(sites, config.max_off_targets());
    log::info!(
        "{} of {} target sites passed the off-target filter",
        specific.len(),
        total
    );

    let exonic = filter_by_exon_containment(specific, exons);
    log::info!("{} target sites cut inside coding exons", exonic.len());

    let located = assign_gene_location_fractions(exonic, exons)?;
    let ordered = order_by_cut_site(located, exons.strand());

    Ok(ordered.into_iter().map(Arc::new).collect())
}
