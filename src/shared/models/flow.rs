//! §3 `FlowSegment` / `FlowDecomposition` (§4.7 flow attribution).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::address::Address;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowSegment {
    pub from: Address,
    pub to: Address,
    pub flow: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowDecomposition {
    pub segments: Vec<FlowSegment>,
    pub total_flow: f64,
    pub tainted_flow: f64,
    pub clean_flow: f64,
    pub source_attribution: HashMap<Address, f64>,
    pub sink_attribution: HashMap<Address, f64>,
    /// `[0, 1]`.
    pub flow_efficiency: f64,
    /// `[0, 1]`.
    pub decomposition_quality: f64,
    /// `true` when the computation hit its time budget and was cut short.
    pub partial: bool,
}
