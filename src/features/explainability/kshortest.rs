//! §4.6 best-first k-shortest simple-path search.
//!
//! States are kept in an arena with parent pointers (§9 design note:
//! avoid copy-heavy priority-queue entries keyed by the whole path
//! vector); revisit checks walk the bounded parent chain instead of
//! carrying a visited set per state.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use uuid::Uuid;

use crate::config::ExplainabilityConfig;
use crate::shared::models::{Address, EvidencePath, TaintResult, TxEdge, TxGraph};

use super::scoring::{boosted_score, path_score, taint_involvement};

struct Explored {
    node: Address,
    parent: Option<usize>,
    edge: Option<TxEdge>,
    hops: u32,
    cost: f64,
}

#[derive(PartialEq)]
struct HeapItem {
    cost: f64,
    arena_idx: usize,
}

impl Eq for HeapItem {}

impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so `BinaryHeap` (a max-heap) pops the lowest cost first.
        other.cost.partial_cmp(&self.cost).unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn contains_ancestor(arena: &[Explored], mut idx: usize, node: &Address) -> bool {
    loop {
        if &arena[idx].node == node {
            return true;
        }
        match arena[idx].parent {
            Some(parent) => idx = parent,
            None => return false,
        }
    }
}

fn reconstruct(arena: &[Explored], mut idx: usize) -> Vec<TxEdge> {
    let mut segments = Vec::new();
    loop {
        if let Some(edge) = &arena[idx].edge {
            segments.push(edge.clone());
        }
        match arena[idx].parent {
            Some(parent) => idx = parent,
            None => break,
        }
    }
    segments.reverse();
    segments
}

fn edge_cost(edge: &TxEdge, parent_edge: Option<&TxEdge>, config: &ExplainabilityConfig) -> f64 {
    let hop_cost = config.weight_hops;
    let value_cost = (1.0 / edge.value.max(0.1)) * config.weight_value;
    let time_cost = match (parent_edge.and_then(|p| p.block_time), edge.block_time) {
        (Some(last), Some(now)) => {
            let gap = now - last;
            if gap >= 0 {
                config.weight_time * (gap as f64 / 3600.0).min(1.0)
            } else {
                config.weight_time * 2.0
            }
        }
        _ => 0.0,
    };
    hop_cost + value_cost + time_cost
}

/// Finds up to `config.k` simple paths from `source` to `target`, cheapest
/// first, and turns each into a scored [`EvidencePath`].
pub fn k_shortest_evidence_paths(
    graph: &TxGraph,
    source: &Address,
    target: &Address,
    taint: &[TaintResult],
    config: &ExplainabilityConfig,
) -> Vec<EvidencePath> {
    if source == target {
        return Vec::new();
    }

    let mut arena = vec![Explored {
        node: source.clone(),
        parent: None,
        edge: None,
        hops: 0,
        cost: 0.0,
    }];
    let mut heap = BinaryHeap::new();
    heap.push(HeapItem { cost: 0.0, arena_idx: 0 });

    let mut accepted = Vec::new();

    while let Some(HeapItem { arena_idx, .. }) = heap.pop() {
        if accepted.len() >= config.k {
            break;
        }

        let (node, hops, cost, parent_idx) = {
            let state = &arena[arena_idx];
            (state.node.clone(), state.hops, state.cost, arena_idx)
        };

        if &node == target && hops > 0 {
            let segments = reconstruct(&arena, parent_idx);
            let total_value: f64 = segments.iter().map(|e| e.value).sum();
            if total_value < config.min_path_value {
                continue;
            }
            let involvement = taint_involvement(&segments, taint);
            let base = path_score(hops, total_value, &segments, config);
            let score = boosted_score(base, involvement, config);
            accepted.push(EvidencePath {
                id: Uuid::new_v4().to_string(),
                source: source.clone(),
                destination: target.clone(),
                hops,
                total_value,
                segments,
                path_score: score.max(0.0),
                taint_involvement: involvement,
                metadata: Default::default(),
            });
            continue;
        }

        if hops >= config.max_hops {
            continue;
        }

        let parent_edge = arena[arena_idx].edge.clone();
        for out_edge in graph.out_edges(&node) {
            if contains_ancestor(&arena, arena_idx, &out_edge.to) {
                continue;
            }
            let child_cost = cost + edge_cost(out_edge, parent_edge.as_ref(), config);
            let child_idx = arena.len();
            arena.push(Explored {
                node: out_edge.to.clone(),
                parent: Some(arena_idx),
                edge: Some(out_edge.clone()),
                hops: hops + 1,
                cost: child_cost,
            });
            heap.push(HeapItem { cost: child_cost, arena_idx: child_idx });
        }
    }

    accepted
}
