//! §6 report assembly: folds every stage's output into the single
//! per-investigation JSON document.

use std::collections::HashMap;

use crate::features::graph_builder::{fan_in, fan_out, net_flow};
use crate::shared::models::{
    Address, CenterWalletMetrics, EntityCluster, EvidencePath, FlowDecomposition, GraphOverview, IntegrationEvent,
    Report, RiskAssessment, StageStatus, TaintResult, TopNode, TxGraph,
};

const TOP_NODE_COUNT: usize = 10;

fn top_nodes(graph: &TxGraph) -> Vec<TopNode> {
    let mut nodes: Vec<TopNode> = graph
        .nodes()
        .iter()
        .map(|addr| {
            let inbound = fan_in(graph, addr);
            let outbound = fan_out(graph, addr);
            TopNode {
                address: addr.clone(),
                total_value: inbound.total_value + outbound.total_value,
                transaction_count: inbound.count + outbound.count,
            }
        })
        .collect();
    nodes.sort_by(|a, b| b.total_value.partial_cmp(&a.total_value).unwrap_or(std::cmp::Ordering::Equal));
    nodes.truncate(TOP_NODE_COUNT);
    nodes
}

fn aggregate_metrics(graph: &TxGraph, taint: &[TaintResult]) -> HashMap<String, f64> {
    let mut metrics = HashMap::new();
    metrics.insert("density".to_string(), graph.density());
    metrics.insert("totalValue".to_string(), graph.edges().iter().map(|e| e.value.max(0.0)).sum());
    metrics.insert("taintedAddressCount".to_string(), taint.len() as f64);
    metrics.insert(
        "maxTaintShare".to_string(),
        taint.iter().map(|r| r.share).fold(0.0, f64::max),
    );
    metrics
}

/// Assembles the final [`Report`] from every stage's output. `stage_status`
/// is the caller's record of what ran, was skipped, or failed.
#[allow(clippy::too_many_arguments)]
pub fn assemble(
    graph: &TxGraph,
    target: &Address,
    taint: Vec<TaintResult>,
    clusters: Vec<EntityCluster>,
    integration_events: Vec<IntegrationEvent>,
    evidence_paths: Vec<EvidencePath>,
    flow_attribution: Option<FlowDecomposition>,
    influence: Vec<crate::shared::models::AddressInfluence>,
    risk: RiskAssessment,
    stage_status: HashMap<&'static str, StageStatus>,
) -> Report {
    let center_wallet_metrics = {
        let inbound = fan_in(graph, target);
        let outbound = fan_out(graph, target);
        let nf = net_flow(graph, target);
        CenterWalletMetrics {
            fan_in_count: inbound.count,
            fan_out_count: outbound.count,
            net_flow: nf.net_flow,
            flow_ratio: nf.flow_ratio,
        }
    };

    Report {
        target: target.clone(),
        graph_overview: GraphOverview { node_count: graph.node_count(), edge_count: graph.edge_count(), density: graph.density() },
        aggregate_metrics: aggregate_metrics(graph, &taint),
        top_nodes: top_nodes(graph),
        center_wallet_metrics,
        taint_analysis: taint,
        clusters,
        integration_events,
        evidence_paths,
        flow_attribution,
        influence,
        risk,
        stage_status,
    }
}
