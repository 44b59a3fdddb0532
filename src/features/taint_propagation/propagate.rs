//! F2: decaying breadth-first taint relaxation (§4.2).

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::config::TaintConfig;
use crate::shared::models::{Address, TaintResult, TaintSeed, TxGraph};

/// Aggregate metrics over one propagation's results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaintMetrics {
    pub tainted_count: usize,
    pub max_share: f64,
    pub avg_share: f64,
    pub max_hop: u32,
    pub avg_hop: f64,
    pub total_flow: f64,
    pub distinct_incidents: usize,
}

fn metrics_for(results: &[TaintResult]) -> TaintMetrics {
    if results.is_empty() {
        return TaintMetrics::default();
    }
    let count = results.len();
    let max_share = results.iter().map(|r| r.share).fold(0.0, f64::max);
    let avg_share = results.iter().map(|r| r.share).sum::<f64>() / count as f64;
    let max_hop = results.iter().map(|r| r.hop).max().unwrap_or(0);
    let avg_hop = results.iter().map(|r| r.hop as f64).sum::<f64>() / count as f64;
    let total_flow = results.iter().map(|r| r.total_flow).sum();
    let mut incidents: Vec<&str> = results.iter().map(|r| r.incident_id.as_str()).collect();
    incidents.sort_unstable();
    incidents.dedup();

    TaintMetrics {
        tainted_count: count,
        max_share,
        avg_share,
        max_hop,
        avg_hop,
        total_flow,
        distinct_incidents: incidents.len(),
    }
}

/// Relaxes `seeds` over `graph` and returns the best-per-address result
/// plus aggregate metrics. The child share at each relaxation is the
/// parent's already-decayed share times the edge's outflow fraction times
/// a single decay factor, so the invariant `share <= initialTaint *
/// decayFactor^hop` holds by induction without re-applying decay for
/// hops already folded into the parent's share.
pub fn propagate(graph: &TxGraph, seeds: &[TaintSeed], config: &TaintConfig) -> (Vec<TaintResult>, TaintMetrics) {
    let mut best: HashMap<Address, TaintResult> = HashMap::new();
    let mut queue: VecDeque<Address> = VecDeque::new();

    let mut ordered_seeds: Vec<&TaintSeed> = seeds.iter().collect();
    ordered_seeds.sort_by(|a, b| {
        a.address
            .as_str()
            .cmp(b.address.as_str())
            .then(a.incident_id.as_str().cmp(b.incident_id.as_str()))
    });

    for seed in ordered_seeds {
        let candidate = TaintResult {
            address: seed.address.clone(),
            share: seed.initial_taint,
            hop: 0,
            incident_id: seed.incident_id.clone(),
            path: vec![seed.address.clone()],
            total_flow: 0.0,
        };
        let is_better = best.get(&seed.address).map_or(true, |existing| candidate.share > existing.share);
        if is_better {
            best.insert(seed.address.clone(), candidate);
            queue.push_back(seed.address.clone());
        }
    }

    while let Some(addr) = queue.pop_front() {
        let parent = match best.get(&addr) {
            Some(r) => r.clone(),
            None => continue,
        };
        if parent.hop >= config.max_hops {
            continue;
        }

        let total_out: f64 = graph
            .out_edges(&addr)
            .filter(|e| e.value >= config.min_value_threshold)
            .map(|e| e.value)
            .sum();
        if total_out <= 0.0 {
            continue;
        }

        for edge in graph.out_edges(&addr) {
            if edge.value < config.min_value_threshold {
                continue;
            }
            if parent.path.contains(&edge.to) {
                continue;
            }

            let child_hop = parent.hop + 1;
            let child_share = parent.share * (edge.value / total_out) * config.decay_factor;
            if child_share < config.dust_threshold || child_hop > config.max_hops {
                continue;
            }

            let is_better = best
                .get(&edge.to)
                .map_or(true, |existing| child_share > existing.share);
            if is_better {
                let mut path = parent.path.clone();
                path.push(edge.to.clone());
                best.insert(
                    edge.to.clone(),
                    TaintResult {
                        address: edge.to.clone(),
                        share: child_share,
                        hop: child_hop,
                        incident_id: parent.incident_id.clone(),
                        path,
                        total_flow: parent.total_flow + edge.value,
                    },
                );
                queue.push_back(edge.to.clone());
            }
        }
    }

    let mut results: Vec<TaintResult> = best.into_values().collect();
    results.sort_by(|a, b| a.address.as_str().cmp(b.address.as_str()));
    let metrics = metrics_for(&results);
    (results, metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::{Direction, GraphBuilder, ProgramId, TxSignature};

    fn edge(from: &str, to: &str, value: f64) -> crate::shared::models::TxEdge {
        crate::shared::models::TxEdge {
            from: Address::from(from),
            to: Address::from(to),
            value,
            slot: None,
            block_time: None,
            program: ProgramId::from("system"),
            tx_signature: TxSignature::from("sig"),
            direction: Direction::Neutral,
        }
    }

    fn result_for<'a>(results: &'a [TaintResult], addr: &str) -> &'a TaintResult {
        results.iter().find(|r| r.address.as_str() == addr).expect("address not tainted")
    }

    #[test]
    fn linear_chain_decays_geometrically() {
        let mut b = GraphBuilder::new();
        b.push_edge(edge("A", "B", 10.0));
        b.push_edge(edge("B", "C", 10.0));
        let g = b.build();
        let seeds = vec![TaintSeed {
            address: Address::from("A"),
            incident_id: "i1".into(),
            initial_taint: 1.0,
            source: "seed".into(),
        }];
        let (results, _) = propagate(&g, &seeds, &TaintConfig::default());

        let b_result = result_for(&results, "B");
        assert!((b_result.share - 0.8).abs() < 1e-9);
        assert_eq!(b_result.hop, 1);

        let c_result = result_for(&results, "C");
        assert!((c_result.share - 0.64).abs() < 1e-9);
        assert_eq!(c_result.hop, 2);
    }

    #[test]
    fn proportional_split_divides_by_outflow_share() {
        let mut b = GraphBuilder::new();
        b.push_edge(edge("A", "B", 3.0));
        b.push_edge(edge("A", "C", 7.0));
        let g = b.build();
        let seeds = vec![TaintSeed {
            address: Address::from("A"),
            incident_id: "i1".into(),
            initial_taint: 1.0,
            source: "seed".into(),
        }];
        let (results, _) = propagate(&g, &seeds, &TaintConfig::default());

        assert!((result_for(&results, "B").share - 0.24).abs() < 1e-9);
        assert!((result_for(&results, "C").share - 0.56).abs() < 1e-9);
    }

    #[test]
    fn every_result_respects_the_decay_bound() {
        let mut b = GraphBuilder::new();
        b.push_edge(edge("A", "B", 3.0));
        b.push_edge(edge("B", "C", 2.0));
        b.push_edge(edge("B", "D", 1.0));
        let g = b.build();
        let config = TaintConfig::default();
        let seeds = vec![TaintSeed {
            address: Address::from("A"),
            incident_id: "i1".into(),
            initial_taint: 0.9,
            source: "seed".into(),
        }];
        let (results, _) = propagate(&g, &seeds, &config);
        for r in &results {
            r.validate(config.decay_factor, 0.9).unwrap();
        }
    }

    #[test]
    fn empty_graph_yields_no_results_beyond_seed_with_no_outflow() {
        let g = GraphBuilder::new().build();
        let seeds = vec![TaintSeed {
            address: Address::from("A"),
            incident_id: "i1".into(),
            initial_taint: 1.0,
            source: "seed".into(),
        }];
        let (results, metrics) = propagate(&g, &seeds, &TaintConfig::default());
        assert_eq!(results.len(), 1);
        assert_eq!(metrics.tainted_count, 1);
    }
}
