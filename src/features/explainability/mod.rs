//! F4: multi-criteria k-shortest evidence paths (§4.6).

pub mod kshortest;
pub mod scoring;

use std::collections::HashSet;

use crate::config::ExplainabilityConfig;
use crate::features::graph_builder::fan_in;
use crate::shared::models::{Address, EvidencePath, TaintResult, TxGraph, TxSignature};

pub use kshortest::k_shortest_evidence_paths;

/// Picks up to `top_n_anchors` addresses (high-value or highly-tainted,
/// distinct from `target`), runs k-shortest paths both to and from
/// `target` against each, and returns the top `top_n_results` by
/// [`EvidencePath::path_score`].
pub fn select_evidence_paths(
    graph: &TxGraph,
    target: &Address,
    taint: &[TaintResult],
    config: &ExplainabilityConfig,
) -> Vec<EvidencePath> {
    let mut candidates: Vec<(Address, f64)> = graph
        .nodes()
        .iter()
        .filter(|addr| *addr != target)
        .map(|addr| {
            let taint_share = taint.iter().find(|r| &r.address == addr).map(|r| r.share).unwrap_or(0.0);
            let volume = fan_in(graph, addr).total_value;
            (addr.clone(), taint_share.max(0.0) * 0.7 + (volume / 1000.0).min(1.0) * 0.3)
        })
        .collect();
    candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    candidates.truncate(config.top_n_anchors);

    let mut seen_routes: HashSet<Vec<TxSignature>> = HashSet::new();
    let mut all_paths = Vec::new();

    for (anchor, _) in &candidates {
        for (source, destination) in [(target.clone(), anchor.clone()), (anchor.clone(), target.clone())] {
            for path in k_shortest_evidence_paths(graph, &source, &destination, taint, config) {
                let route: Vec<TxSignature> = path.segments.iter().map(|seg| seg.tx_signature.clone()).collect();
                if seen_routes.insert(route) {
                    all_paths.push(path);
                }
            }
        }
    }

    all_paths.sort_by(|a, b| b.path_score.partial_cmp(&a.path_score).unwrap_or(std::cmp::Ordering::Equal));
    all_paths.truncate(config.top_n_results);
    all_paths
}
