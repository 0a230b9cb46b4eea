use std::fmt::Display;

use derive_getters::Dissolve;
use eyre::{ensure, Report, Result};

/// Coordinate on the plus strand of the reference.
pub type Position = i64;

/// Closed genomic interval [start, end] covering a single coding exon.
///
/// Unlike [`Interval`](super::Interval), both boundaries are part of the exon: this is how exon
/// coordinates are reported by annotation sources. A single-base exon has `start == end`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Dissolve)]
pub struct Exon {
    start: Position,
    end: Position,
}

#[allow(clippy::len_without_is_empty)]
impl Exon {
    pub fn new(start: Position, end: Position) -> Result<Self> {
        ensure!(
            start <= end,
            "Invalid exon boundaries: start ({start}) > end ({end})"
        );
        Ok(Self { start, end })
    }

    #[inline(always)]
    pub fn start(&self) -> Position {
        self.start
    }

    #[inline(always)]
    pub fn end(&self) -> Position {
        self.end
    }

    /// Number of bases in the exon, both boundaries included.
    pub fn len(&self) -> Position {
        self.end - self.start + 1
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.start <= pos && pos <= self.end
    }

    /// A cut is indexed by the base preceding it, so a cut at `pos` stays inside the exon only if
    /// `pos` is not the last exon base. Single-base exons can't hold a cut at all.
    pub fn holds_cut(&self, pos: Position) -> bool {
        self.start <= pos && pos < self.end
    }
}

impl Display for Exon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

impl TryFrom<(Position, Position)> for Exon {
    type Error = Report;

    fn try_from(value: (Position, Position)) -> Result<Self, Self::Error> {
        Self::new(value.0, value.1)
    }
}
