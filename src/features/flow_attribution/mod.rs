//! F5 (flow half): min-cost flow decomposition (§4.7).

pub mod mincost;
pub mod network;

use std::time::Duration;

use crate::config::FlowConfig;
use crate::shared::models::{FlowDecomposition, IntegrationCatalogData, TaintResult, TxGraph};

pub use mincost::decompose;
pub use network::{build_arcs, node_supplies};

/// Runs the full §4.7 pipeline: build the network, decompose it, then
/// fold in taint-weighted flow attribution.
pub fn attribute_flow(
    graph: &TxGraph,
    taint: &[TaintResult],
    catalog: Option<&IntegrationCatalogData>,
    config: &FlowConfig,
) -> FlowDecomposition {
    let supplies = node_supplies(graph, taint);
    let arcs = build_arcs(graph, taint, catalog, config);
    let mut decomposition = decompose(arcs, &supplies, Duration::from_secs(config.time_budget_seconds));

    let taint_share_of = |addr: &crate::shared::models::Address| {
        taint.iter().find(|r| &r.address == addr).map(|r| r.share).unwrap_or(0.0)
    };
    decomposition.tainted_flow = decomposition.segments.iter().map(|s| s.flow * taint_share_of(&s.from)).sum();
    decomposition.clean_flow = (decomposition.total_flow - decomposition.tainted_flow).max(0.0);

    decomposition
}
