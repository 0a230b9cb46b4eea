use eyre::{ensure, eyre, Result};
use itertools::Itertools;

use super::exon::{Exon, Position};
use super::strand::Strand;

/// Exon structure of a single gene: ascending, non-overlapping closed exon intervals and the
/// strand the gene is transcribed from. Introns are the gaps between consecutive exons.
///
/// The map never sorts or merges its input. Exons must be supplied in ascending order, exactly as
/// annotation sources report them for a transcript.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ExonMap {
    exons: Vec<Exon>,
    strand: Strand,
    total_length: Position,
}

impl ExonMap {
    pub fn new(exons: Vec<Exon>, strand: Strand) -> Result<Self> {
        for (prev, next) in exons.iter().tuple_windows() {
            ensure!(
                prev.end() < next.start(),
                "Exons must be sorted and non-overlapping, got {prev} followed by {next}"
            );
        }

        let total_length = exons.iter().map(|x| x.len()).sum();
        Ok(Self {
            exons,
            strand,
            total_length,
        })
    }

    /// Build the map from raw `(start, end)` boundaries, validating each exon.
    pub fn from_bounds(
        bounds: impl IntoIterator<Item = (Position, Position)>,
        strand: Strand,
    ) -> Result<Self> {
        let exons = bounds
            .into_iter()
            .map(Exon::try_from)
            .collect::<Result<Vec<_>>>()?;
        Self::new(exons, strand)
    }

    pub fn exons(&self) -> &[Exon] {
        &self.exons
    }

    pub fn strand(&self) -> Strand {
        self.strand
    }

    pub fn len(&self) -> usize {
        self.exons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exons.is_empty()
    }

    /// Total number of exonic bases.
    pub fn total_length(&self) -> Position {
        self.total_length
    }

    /// True if a cut indexed at `pos` falls inside any exon. Exons that are too short to hold a cut
    /// are reported and skipped.
    pub fn holds_cut(&self, pos: Position) -> bool {
        for exon in &self.exons {
            if exon.start() >= exon.end() {
                log::debug!("Skipping exon {exon}: it can't contain a cut site");
                continue;
            }
            if exon.holds_cut(pos) {
                return true;
            }
        }
        false
    }

    /// Number of exonic bases at or before `pos` on the plus strand.
    fn exonic_upto(&self, pos: Position) -> Position {
        let mut covered = 0;
        for exon in &self.exons {
            if exon.end() <= pos {
                covered += exon.len();
            } else {
                covered += (pos + 1 - exon.start()).max(0);
                break;
            }
        }
        covered
    }

    /// Relative position of `pos` within the gene's coding sequence: the exonic bases preceding
    /// the position in transcription order (including the base at `pos` for forward genes),
    /// divided by the total exonic length.
    ///
    /// Fails if the map is empty or `pos` is outside every exon.
    pub fn fraction_at(&self, pos: Position) -> Result<f64> {
        ensure!(
            self.total_length > 0,
            "Can't compute the gene location fraction: the exon map is empty"
        );
        if !self.exons.iter().any(|x| x.contains(pos)) {
            return Err(eyre!(
                "Can't compute the gene location fraction: position {pos} is outside all exons"
            ));
        }

        let upto = self.exonic_upto(pos);
        let preceding = match self.strand {
            Strand::Forward => upto,
            Strand::Reverse => self.total_length - upto,
        };
        Ok(preceding as f64 / self.total_length as f64)
    }

    /// Number of exonic bases removed between two cut sites. Cuts are indexed by the base
    /// preceding them, so the deleted span is `(left, right]` on the plus strand.
    pub fn deletion_count(&self, cut1: Position, cut2: Position) -> Position {
        let (left, right) = (cut1.min(cut2), cut1.max(cut2));

        let mut deleted = 0;
        for exon in &self.exons {
            let (start, end) = (exon.start(), exon.end());

            if end <= left {
                // Exon is entirely upstream of the deletion
                continue;
            } else if start > right {
                // Exons are sorted, nothing downstream can overlap
                break;
            }

            deleted += if start <= left {
                if end <= right {
                    end - left
                } else {
                    right - left
                }
            } else if end <= right {
                end - start + 1
            } else {
                right - start + 1
            };
        }
        deleted
    }
}
