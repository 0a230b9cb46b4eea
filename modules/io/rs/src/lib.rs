pub mod chopchop;
pub mod construct;
pub mod exons;
pub mod report;
pub mod settings;

pub use construct::ConstructTemplate;
pub use settings::Settings;
