pub use config::{Config, ConfigBuilder};
pub use deletion::DeletionStats;
pub use designer::GuideDesigner;
pub use pair::GuidePair;
pub use rank::SortKey;
pub use site::{SiteError, TargetSite, TargetSiteBuilder};
pub use synthesis::PairSynthesizer;

pub mod config;
pub mod deletion;
mod designer;
mod pair;
pub mod pipeline;
pub mod rank;
pub mod site;
mod synthesis;
