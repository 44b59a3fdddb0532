//! Small stable-hashing helpers used to build the TaintCache composite key
//! (§4.3): blake3 over sorted, canonical byte input.

use blake3::Hasher;

use super::models::{Address, IncidentId, TxGraph};

/// `H(sorted [(incidentId, address, initialTaint)])`.
pub fn incident_set_hash(seeds: &[(IncidentId, Address, f64)]) -> String {
    let mut sorted: Vec<&(IncidentId, Address, f64)> = seeds.iter().collect();
    sorted.sort_by(|a, b| (a.0.as_str(), a.1.as_str()).cmp(&(b.0.as_str(), b.1.as_str())));

    let mut hasher = Hasher::new();
    for (incident, addr, taint) in sorted {
        hasher.update(incident.as_str().as_bytes());
        hasher.update(b"\0");
        hasher.update(addr.as_str().as_bytes());
        hasher.update(b"\0");
        hasher.update(&taint.to_le_bytes());
        hasher.update(b"\n");
    }
    hasher.finalize().to_hex().to_string()
}

/// `H(|E|, |V|, first N sorted addresses)`.
pub fn graph_hash(graph: &TxGraph, sample_n: usize) -> String {
    let mut addrs: Vec<&str> = graph.nodes().iter().map(|a| a.as_str()).collect();
    addrs.sort_unstable();
    addrs.truncate(sample_n);

    let mut hasher = Hasher::new();
    hasher.update(&(graph.edge_count() as u64).to_le_bytes());
    hasher.update(&(graph.node_count() as u64).to_le_bytes());
    for addr in addrs {
        hasher.update(addr.as_bytes());
        hasher.update(b"\0");
    }
    hasher.finalize().to_hex().to_string()
}
