//! §3 `EvidencePath` (§4.6 explainability).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::address::Address;
use super::graph::TxEdge;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidencePath {
    pub id: String,
    pub source: Address,
    pub destination: Address,
    pub hops: u32,
    pub total_value: f64,
    pub segments: Vec<TxEdge>,
    /// Score, non-negative.
    pub path_score: f64,
    /// Taint involvement in `[0, 1]`.
    pub taint_involvement: f64,
    pub metadata: HashMap<String, String>,
}

impl EvidencePath {
    /// §8 universal invariant: segments form a simple directed path from
    /// `source` to `destination`, with no repeated intermediate address.
    pub fn validate(&self) -> Result<(), String> {
        let Some(first) = self.segments.first() else {
            return Err("evidence path has no segments".into());
        };
        let Some(last) = self.segments.last() else {
            return Err("evidence path has no segments".into());
        };
        if first.from != self.source {
            return Err("segments[0].from must equal source".into());
        }
        if last.to != self.destination {
            return Err("segments[-1].to must equal destination".into());
        }
        for window in self.segments.windows(2) {
            if window[0].to != window[1].from {
                return Err("segments must chain: segments[i-1].to == segments[i].from".into());
            }
        }
        let mut seen = std::collections::HashSet::new();
        seen.insert(&self.source);
        for (i, seg) in self.segments.iter().enumerate() {
            let is_last = i == self.segments.len() - 1;
            if !is_last && !seen.insert(&seg.to) {
                return Err(format!("intermediate address {} repeats", seg.to));
            }
        }
        Ok(())
    }
}
