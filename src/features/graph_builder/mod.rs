//! F1: transaction graph construction and derived metrics (§4.1).
//!
//! The graph type and its builder live in [`crate::shared::models::graph`]
//! since every later stage depends on them; this module holds the
//! derived-metrics layer and transaction-to-edge extraction that sit on
//! top of it.

pub mod extraction;
pub mod metrics;

pub use extraction::extract_edges;
pub use metrics::{fan_in, fan_out, net_flow, reachable_within, FanStats, NetFlow};
