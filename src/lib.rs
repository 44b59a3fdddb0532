//! chainwitness: wallet-investigation engine over transaction graphs.
//!
//! Builds a transaction graph around a target address, propagates taint
//! from known-incident seeds, clusters behaviorally-linked addresses,
//! surfaces evidence paths, decomposes flow and influence, and produces
//! a weighted, explainable risk assessment.

pub mod config;
pub mod errors;
pub mod features;
pub mod pipeline;
pub mod shared;

pub use errors::{ChainwitnessError, Result};
pub use pipeline::{analyze, InvestigationLifecycle, InvestigationState};
