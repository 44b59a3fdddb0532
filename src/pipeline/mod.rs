//! The investigation pipeline: lifecycle tracking, the fork-join driver,
//! report assembly, and the regression harness that exercises all of it
//! against fixed historical cases.

pub mod driver;
pub mod regression;
pub mod report;
pub mod state;

pub use driver::{analyze, fetch_graph, run_from_graph};
pub use state::{InvestigationLifecycle, InvestigationState};
