use std::sync::Arc;

use eyre::Result;

use gblock_core_rs::loc::{ExonMap, Position};

use crate::deletion::{self, DeletionStats};
use crate::site::TargetSite;

/// Two target sites whose cuts excise the segment between them.
///
/// The upstream site always has the smaller (or equal) plus-strand cut coordinate, regardless of
/// the order the sites were supplied in.
#[derive(Clone, PartialEq, Debug)]
pub struct GuidePair {
    upstream: Arc<TargetSite>,
    downstream: Arc<TargetSite>,
    separation: Position,
    deletion: Option<DeletionStats>,
}

impl GuidePair {
    /// Pairs two sites. Deletion statistics are computed right away if the exon map is given.
    pub fn new(
        first: Arc<TargetSite>,
        second: Arc<TargetSite>,
        exons: Option<&ExonMap>,
    ) -> Result<Self> {
        let (upstream, downstream) = if first.cut_site() <= second.cut_site() {
            (first, second)
        } else {
            (second, first)
        };
        let separation = downstream.cut_site() - upstream.cut_site();

        let mut pair = Self {
            upstream,
            downstream,
            separation,
            deletion: None,
        };
        if let Some(exons) = exons {
            pair.compute_deletion_stats(exons)?;
        }
        Ok(pair)
    }

    pub fn compute_deletion_stats(&mut self, exons: &ExonMap) -> Result<&DeletionStats> {
        let stats = deletion::compute(
            self.upstream.cut_site(),
            self.downstream.cut_site(),
            exons,
        )?;
        Ok(&*self.deletion.insert(stats))
    }

    pub fn upstream(&self) -> &Arc<TargetSite> {
        &self.upstream
    }

    pub fn downstream(&self) -> &Arc<TargetSite> {
        &self.downstream
    }

    /// Distance between the two cut sites in base pairs.
    pub fn separation(&self) -> Position {
        self.separation
    }

    pub fn deletion(&self) -> Option<&DeletionStats> {
        self.deletion.as_ref()
    }

    pub fn deletion_count(&self) -> Option<Position> {
        self.deletion.map(|x| x.count())
    }

    pub fn deletion_fraction(&self) -> Option<f64> {
        self.deletion.map(|x| x.fraction())
    }

    pub fn deletion_percent(&self) -> Option<u32> {
        self.deletion.map(|x| x.percent())
    }
}
