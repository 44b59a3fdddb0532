//! §3 `AddressInfluence` (§4.8 influence analysis).

use serde::{Deserialize, Serialize};

use super::address::Address;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum Criticality {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressInfluence {
    pub address: Address,
    pub baseline_flow: f64,
    pub counterfactual_flow: f64,
    pub influence_score: f64,
    pub taint_influence: f64,
    pub centrality: f64,
    pub criticality: Criticality,
}

impl Criticality {
    /// §4.8: HIGH if score > 0.1 or centrality > 0.3; MEDIUM if score > 0.05
    /// or centrality > 0.1; else LOW.
    pub fn classify(score: f64, centrality: f64) -> Self {
        if score > 0.1 || centrality > 0.3 {
            Criticality::High
        } else if score > 0.05 || centrality > 0.1 {
            Criticality::Medium
        } else {
            Criticality::Low
        }
    }
}
