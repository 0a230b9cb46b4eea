use std::fmt::{self, Display, Formatter};
use std::ops::RangeInclusive;
use std::sync::Arc;

use derive_more::{Display, Error};
use eyre::{eyre, Result};

use gblock_core_rs::loc::{ExonMap, Interval, Position, Strand};

/// Shortest target sequence (PAM included) that is still usable as a guide.
pub const MIN_SEQUENCE_LENGTH: usize = 18;
/// Length of the trailing protospacer adjacent motif (NGG).
pub const PAM_LENGTH: usize = 3;
/// Number of bases directly upstream of the PAM that make up the seed region.
pub const SEED_LENGTH: usize = 4;
/// GC content (%) a G-start variant must have to be kept.
pub const START_VARIANT_GC: RangeInclusive<u8> = 40..=70;

/// Reasons a target site can't be constructed.
#[derive(Clone, PartialEq, Eq, Debug, Display, Error)]
pub enum SiteError {
    #[display("Target site is missing its sequence")]
    MissingSequence,
    #[display("Target site is missing its genomic location")]
    MissingGenomicLocation,
    #[display("Target site is missing its exon number")]
    MissingExonNumber,
    #[display("Target site is missing its strand")]
    MissingStrand,
    #[display("Target site is missing its off-target counts")]
    MissingOffTargets,
    #[display("Invalid base '{base}' at position {position} of the target sequence")]
    InvalidBase { base: char, position: usize },
    #[display("Target sequence has {length} bases, at least {minimum} are required")]
    TooShort { length: usize, minimum: usize },
    #[display("Genomic location {location} is too close to the end of the coordinate range")]
    LocationOutOfRange { location: Position },
}

/// A candidate CRISPR target: a guide sequence with its trailing PAM, anchored on the reference.
///
/// All derived values (cut site, GC content, seed thymine) are computed once at construction.
/// The only mutable part is the gene location fraction, which is assigned at most once after the
/// gene's exon structure is known. Sites are shared as `Arc<TargetSite>` by the pairing stage.
#[derive(Clone, PartialEq, Debug)]
pub struct TargetSite {
    sequence: String,
    span: Interval<Position>,
    exon_number: u32,
    strand: Strand,
    off_targets: [u32; 4],
    gc_content: u8,
    cut_site: Position,
    contains_seed_thymine: bool,
    gene_location_fraction: Option<f64>,
}

impl TargetSite {
    /// Constructs a new `TargetSite`, validating that:
    /// 1. the sequence consists of A/C/G/T only (lowercase is accepted and uppercased);
    /// 2. the sequence has at least [`MIN_SEQUENCE_LENGTH`] bases.
    pub fn new(
        sequence: impl Into<String>,
        genomic_location: Position,
        exon_number: u32,
        strand: Strand,
        off_targets: [u32; 4],
    ) -> Result<Self, SiteError> {
        let mut sequence = sequence.into();
        sequence.make_ascii_uppercase();

        if let Some((position, base)) = sequence
            .chars()
            .enumerate()
            .find(|(_, base)| !matches!(base, 'A' | 'C' | 'G' | 'T'))
        {
            return Err(SiteError::InvalidBase { base, position });
        }
        if sequence.len() < MIN_SEQUENCE_LENGTH {
            return Err(SiteError::TooShort {
                length: sequence.len(),
                minimum: MIN_SEQUENCE_LENGTH,
            });
        }

        Self::assemble(
            sequence,
            genomic_location,
            exon_number,
            strand,
            off_targets,
            None,
        )
    }

    pub fn builder() -> TargetSiteBuilder {
        TargetSiteBuilder::default()
    }

    // Callers guarantee a valid sequence of at least MIN_SEQUENCE_LENGTH bases.
    fn assemble(
        sequence: String,
        genomic_location: Position,
        exon_number: u32,
        strand: Strand,
        off_targets: [u32; 4],
        gene_location_fraction: Option<f64>,
    ) -> Result<Self, SiteError> {
        let length = sequence.len() as Position;
        let end = genomic_location
            .checked_add(length)
            .ok_or(SiteError::LocationOutOfRange {
                location: genomic_location,
            })?;
        let span = Interval::new(genomic_location, end).map_err(|_| SiteError::TooShort {
            length: sequence.len(),
            minimum: MIN_SEQUENCE_LENGTH,
        })?;
        let gc = sequence.bytes().filter(|x| matches!(x, b'G' | b'C')).count();
        // The PAM is part of the sequence here, so it is counted as well
        let gc_content = (100.0 * gc as f64 / sequence.len() as f64).round() as u8;

        // Both offsets stay below the span end, which is already known to fit
        let cut_site = match strand {
            Strand::Forward => genomic_location + (length - 4),
            Strand::Reverse => genomic_location + 5,
        };

        let seed_end = sequence.len() - PAM_LENGTH;
        let contains_seed_thymine = sequence[seed_end - SEED_LENGTH..seed_end].contains('T');

        Ok(Self {
            span,
            sequence,
            exon_number,
            strand,
            off_targets,
            gc_content,
            cut_site,
            contains_seed_thymine,
            gene_location_fraction,
        })
    }

    /// Target sequence, including the trailing PAM.
    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    /// Position of the first sequence base on the reference.
    pub fn genomic_location(&self) -> Position {
        self.span.start()
    }

    /// Half-open span of the sequence on the reference.
    pub fn span(&self) -> &Interval<Position> {
        &self.span
    }

    pub fn exon_number(&self) -> u32 {
        self.exon_number
    }

    pub fn strand(&self) -> Strand {
        self.strand
    }

    /// Number of off-target hits with 0, 1, 2, and 3 mismatches.
    pub fn off_targets(&self) -> &[u32; 4] {
        &self.off_targets
    }

    /// Rounded GC percentage of the whole sequence, PAM included.
    pub fn gc_content(&self) -> u8 {
        self.gc_content
    }

    /// Plus-strand coordinate of the base immediately preceding the cleavage point.
    pub fn cut_site(&self) -> Position {
        self.cut_site
    }

    /// True if the seed region (the bases right before the PAM) contains at least one T.
    pub fn contains_seed_thymine(&self) -> bool {
        self.contains_seed_thymine
    }

    pub fn gene_location_fraction(&self) -> Option<f64> {
        self.gene_location_fraction
    }

    /// True if the cut falls inside one of the exons and is not placed after the exon's last base.
    pub fn cut_in_range(&self, exons: &ExonMap) -> bool {
        exons.holds_cut(self.cut_site)
    }

    /// Assigns the relative position of the cut site within the gene's coding sequence.
    /// The value can be assigned only once.
    pub fn set_gene_location_fraction(&mut self, exons: &ExonMap) -> Result<()> {
        if self.gene_location_fraction.is_some() {
            return Err(eyre!(
                "Gene location fraction of the target site {} is already set",
                self.sequence
            ));
        }
        self.gene_location_fraction = Some(exons.fraction_at(self.cut_site)?);
        Ok(())
    }

    /// True if reference spans of both sites share at least one base.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.span.intersects(&other.span)
    }

    /// New site without the first `n` sequence bases. The cut site stays the same.
    ///
    /// Truncating zero bases returns the same shared site. Returns `None` if the truncated
    /// sequence would be shorter than [`MIN_SEQUENCE_LENGTH`].
    pub fn truncate_front(self: &Arc<Self>, n: usize) -> Option<Arc<Self>> {
        if n == 0 {
            return Some(Arc::clone(self));
        }
        if self.sequence.len().saturating_sub(n) < MIN_SEQUENCE_LENGTH {
            log::warn!(
                "Can't truncate {} by {n} bases: the guide would have fewer than {MIN_SEQUENCE_LENGTH} bases",
                self.sequence
            );
            return None;
        }

        // On the reverse strand the 5' end of the guide is the rightmost reference base
        let genomic_location = match self.strand {
            Strand::Forward => self.genomic_location() + n as Position,
            Strand::Reverse => self.genomic_location(),
        };
        Self::assemble(
            self.sequence[n..].to_string(),
            genomic_location,
            self.exon_number,
            self.strand,
            self.off_targets,
            self.gene_location_fraction,
        )
        .ok()
        .map(Arc::new)
    }

    /// All versions of the site that start with G: the site itself and/or the site without its
    /// first base. Only variants with GC content in [`START_VARIANT_GC`] are kept.
    pub fn find_start_variants(self: &Arc<Self>) -> Vec<Arc<Self>> {
        self.sequence
            .bytes()
            .take(2)
            .enumerate()
            .filter(|(_, base)| *base == b'G')
            .filter_map(|(ind, _)| self.truncate_front(ind))
            .filter(|x| START_VARIANT_GC.contains(&x.gc_content))
            .collect()
    }
}

impl Display for TargetSite {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sequence)
    }
}

#[cfg(test)]
impl TargetSite {
    pub fn dummy(sequence: &str, genomic_location: Position, strand: Strand) -> Self {
        TargetSite::new(sequence, genomic_location, 1, strand, [0, 0, 0, 0]).unwrap()
    }
}

/// Step-by-step construction of a [`TargetSite`] where every field must be provided explicitly.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct TargetSiteBuilder {
    sequence: Option<String>,
    genomic_location: Option<Position>,
    exon_number: Option<u32>,
    strand: Option<Strand>,
    off_targets: Option<[u32; 4]>,
}

impl TargetSiteBuilder {
    pub fn sequence(mut self, sequence: impl Into<String>) -> Self {
        self.sequence = Some(sequence.into());
        self
    }

    pub fn genomic_location(mut self, genomic_location: Position) -> Self {
        self.genomic_location = Some(genomic_location);
        self
    }

    pub fn exon_number(mut self, exon_number: u32) -> Self {
        self.exon_number = Some(exon_number);
        self
    }

    pub fn strand(mut self, strand: Strand) -> Self {
        self.strand = Some(strand);
        self
    }

    pub fn off_targets(mut self, off_targets: [u32; 4]) -> Self {
        self.off_targets = Some(off_targets);
        self
    }

    pub fn build(self) -> Result<TargetSite, SiteError> {
        TargetSite::new(
            self.sequence.ok_or(SiteError::MissingSequence)?,
            self.genomic_location
                .ok_or(SiteError::MissingGenomicLocation)?,
            self.exon_number.ok_or(SiteError::MissingExonNumber)?,
            self.strand.ok_or(SiteError::MissingStrand)?,
            self.off_targets.ok_or(SiteError::MissingOffTargets)?,
        )
    }
}
