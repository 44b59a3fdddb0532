//! §4.7 flow-network construction: node supply/demand and per-edge
//! capacity/cost.

use std::collections::HashMap;

use crate::config::FlowConfig;
use crate::features::graph_builder::net_flow;
use crate::shared::models::{Address, IntegrationCatalogData, ServiceType, TaintResult, TxGraph};

#[derive(Debug, Clone)]
pub struct NetworkArc {
    pub from: Address,
    pub to: Address,
    pub capacity: f64,
    pub unit_cost: f64,
}

fn taint_share_of(taint: &[TaintResult], addr: &Address) -> f64 {
    taint.iter().find(|r| &r.address == addr).map(|r| r.share).unwrap_or(0.0)
}

fn is_bridge(catalog: Option<&IntegrationCatalogData>, addr: &Address) -> bool {
    catalog
        .map(|c| c.services.iter().any(|s| &s.address == addr && s.r#type == ServiceType::Bridge))
        .unwrap_or(false)
}

fn edge_unit_cost(
    from: &Address,
    to: &Address,
    taint: &[TaintResult],
    catalog: Option<&IntegrationCatalogData>,
    config: &FlowConfig,
) -> f64 {
    let taint_delta = (taint_share_of(taint, to) - taint_share_of(taint, from)).max(0.0);
    let program_penalty = if is_bridge(catalog, from) || is_bridge(catalog, to) {
        config.bridge_program_penalty
    } else {
        config.default_program_penalty
    };
    config.base_unit_cost + taint_delta * config.taint_delta_cost_weight + program_penalty
}

/// Builds supplies (positive = source, negative = sink) from graph net
/// flow; when every address is near-balanced, synthesizes sources from
/// the top-3 most-tainted addresses and sinks from the bottom-3.
pub fn node_supplies(graph: &TxGraph, taint: &[TaintResult]) -> HashMap<Address, f64> {
    let mut supplies: HashMap<Address, f64> = graph
        .nodes()
        .iter()
        .map(|addr| (addr.clone(), net_flow(graph, addr).net_flow))
        .collect();

    let near_zero = supplies.values().all(|v| v.abs() < 1e-6);
    if near_zero && !graph.nodes().is_empty() {
        let total_value: f64 = graph.edges().iter().map(|e| e.value.max(0.0)).sum();
        let mut by_taint: Vec<&Address> = graph.nodes().iter().collect();
        by_taint.sort_by(|a, b| {
            taint_share_of(taint, b)
                .partial_cmp(&taint_share_of(taint, a))
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.as_str().cmp(b.as_str()))
        });

        let n = by_taint.len();
        let source_count = n.min(3);
        let sink_count = n.saturating_sub(source_count).min(3);

        supplies.clear();
        if source_count > 0 {
            let per_source = total_value.max(1.0) / source_count as f64;
            for addr in by_taint.iter().take(source_count) {
                supplies.insert((*addr).clone(), per_source);
            }
        }
        if sink_count > 0 {
            let per_sink = total_value.max(1.0) / sink_count as f64;
            for addr in by_taint.iter().rev().take(sink_count) {
                supplies.insert((*addr).clone(), -per_sink);
            }
        }
    }

    supplies
}

/// One arc per graph edge (self-loops already excluded by the builder).
pub fn build_arcs(
    graph: &TxGraph,
    taint: &[TaintResult],
    catalog: Option<&IntegrationCatalogData>,
    config: &FlowConfig,
) -> Vec<NetworkArc> {
    graph
        .edges()
        .iter()
        .filter(|e| e.value > 0.0)
        .map(|e| NetworkArc {
            from: e.from.clone(),
            to: e.to.clone(),
            capacity: e.value,
            unit_cost: edge_unit_cost(&e.from, &e.to, taint, catalog, config),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::{Direction, GraphBuilder, ProgramId, TxEdge, TxSignature};

    fn edge(from: &str, to: &str, value: f64) -> TxEdge {
        TxEdge {
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

    #[test]
    fn supplies_reflect_net_flow_when_unbalanced() {
        let mut b = GraphBuilder::new();
        b.push_edge(edge("A", "B", 10.0));
        let g = b.build();
        let supplies = node_supplies(&g, &[]);
        assert!(supplies[&Address::from("A")] < 0.0);
        assert!(supplies[&Address::from("B")] > 0.0);
    }

    #[test]
    fn arcs_exclude_non_positive_edges() {
        let mut b = GraphBuilder::new();
        b.push_edge(edge("A", "B", 0.0));
        let g = b.build();
        let arcs = build_arcs(&g, &[], None, &FlowConfig::default());
        assert!(arcs.is_empty());
    }
}
