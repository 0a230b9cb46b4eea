use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use eyre::{eyre, Report};

use gblock_core_rs::loc::Strand;

use crate::pair::GuidePair;

/// Field used to order guide pairs.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum SortKey {
    /// Cut site of the upstream guide, in the gene's transcription order.
    GenomicLocation,
    /// Distance between the cut sites, shortest first.
    Separation,
    /// Deleted exonic bases, largest first.
    #[default]
    DeletionCount,
    /// Deleted share of the coding sequence, largest first.
    DeletionFraction,
}

impl SortKey {
    pub fn name(&self) -> &'static str {
        match self {
            Self::GenomicLocation => "genomic_location",
            Self::Separation => "separation",
            Self::DeletionCount => "deletion_count",
            Self::DeletionFraction => "deletion_fraction",
        }
    }
}

impl Display for SortKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for SortKey {
    type Err = Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gnm_loc" | "genomic_location" => Ok(Self::GenomicLocation),
            "gen_sep" | "genomic_separation" | "separation" => Ok(Self::Separation),
            "del_count" | "deletion_count" => Ok(Self::DeletionCount),
            "del_frac" | "deletion_fraction" => Ok(Self::DeletionFraction),
            other => Err(eyre!("Unknown sort key: '{other}'")),
        }
    }
}

// Descending order that keeps pairs without a value at the end
fn descending<T: PartialOrd>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable in-place sort of guide pairs. `strand` is the gene's strand and only matters for
/// [`SortKey::GenomicLocation`].
pub fn rank(pairs: &mut [GuidePair], key: SortKey, strand: Strand) {
    match key {
        SortKey::GenomicLocation => pairs.sort_by_key(|x| x.upstream().cut_site() * strand.sign()),
        SortKey::Separation => pairs.sort_by_key(|x| x.separation()),
        SortKey::DeletionCount => {
            pairs.sort_by(|a, b| descending(a.deletion_count(), b.deletion_count()))
        }
        SortKey::DeletionFraction => {
            pairs.sort_by(|a, b| descending(a.deletion_fraction(), b.deletion_fraction()))
        }
    }
}

/// Same as [`rank`], but the key is given by name. Unknown keys leave the pairs untouched.
pub fn rank_by_name(pairs: &mut [GuidePair], key: &str, strand: Strand) {
    match key.parse::<SortKey>() {
        Ok(key) => rank(pairs, key, strand),
        Err(err) => log::warn!("Can't sort guide pairs: {err}"),
    }
}
