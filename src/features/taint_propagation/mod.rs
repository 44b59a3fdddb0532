//! F2: decaying-BFS taint propagation (§4.2) with a process-wide,
//! composite-keyed cache (§4.3).

pub mod cache;
pub mod propagate;

pub use cache::{CacheKey, TaintCache};
pub use propagate::{propagate, TaintMetrics};
