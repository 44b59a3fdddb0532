//! §4.8 counterfactual influence and Brandes-style betweenness
//! centrality.

use std::collections::{HashMap, VecDeque};

use rayon::prelude::*;

use crate::config::InfluenceConfig;
use crate::shared::models::{Address, AddressInfluence, Criticality, TaintResult, TxGraph};

fn total_flow(graph: &TxGraph) -> f64 {
    graph.edges().iter().filter(|e| e.value > 0.0).map(|e| e.value).sum()
}

fn total_flow_excluding(graph: &TxGraph, removed: &Address) -> f64 {
    graph
        .edges()
        .iter()
        .filter(|e| e.value > 0.0 && e.from != *removed && e.to != *removed)
        .map(|e| e.value)
        .sum()
}

fn taint_share_of(taint: &[TaintResult], addr: &Address) -> f64 {
    taint.iter().find(|r| &r.address == addr).map(|r| r.share).unwrap_or(0.0)
}

/// One BFS pass from `source` accumulating Brandes dependency deltas into
/// `out` (unnormalised, directed, unit-weight).
fn accumulate_from_source(graph: &TxGraph, source: &Address) -> HashMap<Address, f64> {
    let mut sigma: HashMap<Address, f64> = HashMap::new();
    let mut dist: HashMap<Address, i64> = HashMap::new();
    let mut pred: HashMap<Address, Vec<Address>> = HashMap::new();
    let mut stack: Vec<Address> = Vec::new();
    let mut queue: VecDeque<Address> = VecDeque::new();

    sigma.insert(source.clone(), 1.0);
    dist.insert(source.clone(), 0);
    queue.push_back(source.clone());

    while let Some(v) = queue.pop_front() {
        stack.push(v.clone());
        let dv = dist[&v];
        let mut neighbors: Vec<Address> = graph.out_edges(&v).map(|e| e.to.clone()).collect();
        neighbors.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        neighbors.dedup();
        for w in neighbors {
            if !dist.contains_key(&w) {
                dist.insert(w.clone(), dv + 1);
                queue.push_back(w.clone());
            }
            if dist[&w] == dv + 1 {
                *sigma.entry(w.clone()).or_insert(0.0) += sigma[&v];
                pred.entry(w).or_default().push(v.clone());
            }
        }
    }

    let mut delta: HashMap<Address, f64> = HashMap::new();
    let mut out: HashMap<Address, f64> = HashMap::new();
    while let Some(w) = stack.pop() {
        let coeff = (1.0 + *delta.get(&w).unwrap_or(&0.0)) / sigma.get(&w).copied().unwrap_or(1.0);
        if let Some(preds) = pred.get(&w) {
            for v in preds {
                *delta.entry(v.clone()).or_insert(0.0) += sigma[v] * coeff;
            }
        }
        if w != *source {
            *out.entry(w).or_insert(0.0) += *delta.get(&w).unwrap_or(&0.0);
        }
    }
    out
}

/// Normalised betweenness centrality for every node, computed in
/// parallel over source nodes (§5: embarrassingly parallel stage loop).
pub fn betweenness_centrality(graph: &TxGraph) -> HashMap<Address, f64> {
    let n = graph.node_count();
    if n < 3 {
        return graph.nodes().iter().map(|a| (a.clone(), 0.0)).collect();
    }

    let partials: Vec<HashMap<Address, f64>> = graph
        .nodes()
        .par_iter()
        .map(|source| accumulate_from_source(graph, source))
        .collect();

    let mut totals: HashMap<Address, f64> = graph.nodes().iter().map(|a| (a.clone(), 0.0)).collect();
    for partial in partials {
        for (addr, value) in partial {
            *totals.entry(addr).or_insert(0.0) += value;
        }
    }

    let norm = ((n - 1) * (n - 2)).max(1) as f64;
    for value in totals.values_mut() {
        *value = (*value / norm).min(1.0);
    }
    totals
}

/// §4.8 selection: `target` first, then remaining addresses ranked by
/// `taint*0.7 + volumeNormalised*0.3`, truncated to `max_prioritised_addresses`.
fn prioritized_addresses(graph: &TxGraph, target: &Address, taint: &[TaintResult], config: &InfluenceConfig) -> Vec<Address> {
    let max_volume = graph
        .nodes()
        .iter()
        .map(|a| crate::features::graph_builder::fan_in(graph, a).total_value)
        .fold(0.0_f64, f64::max)
        .max(1.0);

    let mut rest: Vec<(Address, f64)> = graph
        .nodes()
        .iter()
        .filter(|a| *a != target)
        .map(|a| {
            let volume_normalised = crate::features::graph_builder::fan_in(graph, a).total_value / max_volume;
            let score = taint_share_of(taint, a) * 0.7 + volume_normalised * 0.3;
            (a.clone(), score)
        })
        .collect();
    rest.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.0.as_str().cmp(b.0.as_str())));

    let mut ordered = vec![target.clone()];
    ordered.extend(rest.into_iter().map(|(a, _)| a));
    ordered.truncate(config.max_prioritised_addresses);
    ordered
}

/// §4.8: computes influence and criticality for up to
/// `config.max_prioritised_addresses` addresses.
pub fn analyze_influence(graph: &TxGraph, target: &Address, taint: &[TaintResult], config: &InfluenceConfig) -> Vec<AddressInfluence> {
    if !graph.contains(target) {
        return Vec::new();
    }

    let baseline = total_flow(graph);
    let centrality = betweenness_centrality(graph);
    let addresses = prioritized_addresses(graph, target, taint, config);

    addresses
        .into_iter()
        .map(|addr| {
            let counterfactual = total_flow_excluding(graph, &addr);
            let influence_score = if baseline > 0.0 { (baseline - counterfactual) / baseline } else { 0.0 };
            let node_centrality = centrality.get(&addr).copied().unwrap_or(0.0);
            AddressInfluence {
                taint_influence: taint_share_of(taint, &addr),
                criticality: Criticality::classify(influence_score, node_centrality),
                centrality: node_centrality,
                address: addr,
                baseline_flow: baseline,
                counterfactual_flow: counterfactual,
                influence_score,
            }
        })
        .collect()
}

/// Mean of the top-3 influence scores.
pub fn network_fragility(results: &[AddressInfluence]) -> f64 {
    let mut scores: Vec<f64> = results.iter().map(|r| r.influence_score).collect();
    scores.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    scores.truncate(3);
    if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    }
}
