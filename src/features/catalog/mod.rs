//! §4.5 integration catalog and event detection.

pub mod catalog;
pub mod events;

pub use catalog::IntegrationCatalog;
pub use events::detect_all as detect_events;
