//! F3: entity clustering from behavioral signals (§4.4).

pub mod cluster;
pub mod signals;

pub use cluster::{build_clusters, validate_disjoint};
pub use signals::extract_all as extract_signals;
