//! §6 per-investigation report shape and §7 per-stage status metadata.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::address::Address;
use super::entity::EntityCluster;
use super::evidence::EvidencePath;
use super::flow::FlowDecomposition;
use super::influence::AddressInfluence;
use super::integration::IntegrationEvent;
use super::risk::RiskAssessment;
use super::taint::TaintResult;

/// Whether a pipeline stage ran cleanly, was skipped, or failed, so
/// downstream consumers can distinguish "unsuitable data" from
/// "pipeline bug" (§7).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageStatus {
    Disabled,
    Completed,
    Error { message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopNode {
    pub address: Address,
    pub total_value: f64,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphOverview {
    pub node_count: usize,
    pub edge_count: usize,
    pub density: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CenterWalletMetrics {
    pub fan_in_count: usize,
    pub fan_out_count: usize,
    pub net_flow: f64,
    pub flow_ratio: f64,
}

/// The single JSON document produced per investigation (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub target: Address,
    pub graph_overview: GraphOverview,
    pub aggregate_metrics: HashMap<String, f64>,
    pub top_nodes: Vec<TopNode>,
    pub center_wallet_metrics: CenterWalletMetrics,
    pub taint_analysis: Vec<TaintResult>,
    pub clusters: Vec<EntityCluster>,
    pub integration_events: Vec<IntegrationEvent>,
    pub evidence_paths: Vec<EvidencePath>,
    pub flow_attribution: Option<FlowDecomposition>,
    pub influence: Vec<AddressInfluence>,
    pub risk: RiskAssessment,
    pub stage_status: HashMap<&'static str, StageStatus>,
}
