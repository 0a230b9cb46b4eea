pub use exon::{Exon, Position};
pub use exon_map::ExonMap;
pub use interval::Interval;
pub use strand::Strand;

mod exon;
mod exon_map;
mod interval;
mod strand;
