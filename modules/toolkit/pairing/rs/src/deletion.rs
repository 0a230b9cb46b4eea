use eyre::{ensure, Result};

use gblock_core_rs::loc::{ExonMap, Position};

/// Coding sequence removed by excising the segment between two cut sites.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct DeletionStats {
    count: Position,
    fraction: f64,
}

impl DeletionStats {
    /// Number of exonic bases between the two cuts.
    pub fn count(&self) -> Position {
        self.count
    }

    /// Share of the gene's total exonic length that is deleted.
    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    /// Deleted share as a truncated percentage.
    pub fn percent(&self) -> u32 {
        (100.0 * self.fraction) as u32
    }
}

/// Deletion statistics for a pair of cut sites, see [`ExonMap::deletion_count`].
/// Fails if the gene has no exonic bases.
pub fn compute(cut1: Position, cut2: Position, exons: &ExonMap) -> Result<DeletionStats> {
    ensure!(
        exons.total_length() > 0,
        "Can't compute the deletion fraction: the exon map is empty"
    );

    let count = exons.deletion_count(cut1, cut2);
    Ok(DeletionStats {
        count,
        fraction: count as f64 / exons.total_length() as f64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gblock_core_rs::loc::Strand;

    #[test]
    fn test_two_exons() {
        let exons = ExonMap::from_bounds([(100, 199), (300, 399)], Strand::Forward).unwrap();
        let stats = compute(150, 350, &exons).unwrap();
        assert_eq!(stats.count(), 100);
        assert_eq!(stats.fraction(), 0.5);
        assert_eq!(stats.percent(), 50);

        // Strand of the gene doesn't change the deleted span
        let exons = ExonMap::from_bounds([(100, 199), (300, 399)], Strand::Reverse).unwrap();
        assert_eq!(compute(350, 150, &exons).unwrap(), stats);
    }

    #[test]
    fn test_within_single_exon() {
        let exons = ExonMap::from_bounds([(0, 99)], Strand::Forward).unwrap();
        let stats = compute(10, 90, &exons).unwrap();
        assert_eq!(stats.count(), 80);
        assert_eq!(stats.fraction(), 0.8);
    }

    #[test]
    fn test_percent_is_truncated() {
        let exons = ExonMap::from_bounds([(0, 299)], Strand::Forward).unwrap();
        // 2/3 of the exon
        let stats = compute(50, 250, &exons).unwrap();
        assert_eq!(stats.percent(), 66);
    }

    #[test]
    fn test_empty_map() {
        let exons = ExonMap::new(vec![], Strand::Forward).unwrap();
        assert!(compute(0, 10, &exons).is_err());
    }
}
