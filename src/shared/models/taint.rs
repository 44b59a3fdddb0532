//! §3 `TaintSeed` / `TaintResult`.

use serde::{Deserialize, Serialize};

use super::address::{Address, IncidentId};

/// A known-malicious address that kicks off propagation at hop 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaintSeed {
    pub address: Address,
    pub incident_id: IncidentId,
    /// Initial taint share, in `[0, 1]`.
    pub initial_taint: f64,
    pub source: String,
}

/// Propagation result recorded for one address.
///
/// Invariants: `hop(seed) == 0`; `path[0] == seed`; `share` is monotone
/// `<= initial_taint * alpha^hop`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaintResult {
    pub address: Address,
    pub share: f64,
    pub hop: u32,
    pub incident_id: IncidentId,
    pub path: Vec<Address>,
    pub total_flow: f64,
}

impl TaintResult {
    pub fn validate(&self, alpha: f64, seed_initial_taint: f64) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.share) {
            return Err(format!("share {} out of [0,1] for {}", self.share, self.address));
        }
        let bound = seed_initial_taint * alpha.powi(self.hop as i32);
        // floating point slack for repeated multiplication.
        if self.share > bound + 1e-9 {
            return Err(format!(
                "share {} exceeds alpha^hop bound {} for {}",
                self.share, bound, self.address
            ));
        }
        if self.hop == 0 {
            if self.path.first() != Some(&self.address) {
                return Err(format!("hop-0 path must start at itself for {}", self.address));
            }
        } else if self.path.last() != Some(&self.address) {
            return Err(format!("path must end at {}", self.address));
        }
        let mut seen = std::collections::HashSet::new();
        for addr in &self.path {
            if !seen.insert(addr) {
                return Err(format!("path revisits {} for result {}", addr, self.address));
            }
        }
        Ok(())
    }
}
