//! Data model shared across all features (§3). Has no dependency on any
//! `features::*` module.

pub mod address;
pub mod entity;
pub mod evidence;
pub mod flow;
pub mod graph;
pub mod influence;
pub mod integration;
pub mod report;
pub mod risk;
pub mod taint;

pub use address::{Address, IncidentId, ProgramId, Slot, TxSignature, UnixSeconds};
pub use entity::{EntityCluster, EntitySignal, SignalKind};
pub use evidence::EvidencePath;
pub use flow::{FlowDecomposition, FlowSegment};
pub use graph::{Direction, GraphBuilder, TxEdge, TxGraph};
pub use influence::{AddressInfluence, Criticality};
pub use integration::{EventKind, IntegrationCatalogData, IntegrationEvent, ServiceEndpoint, ServiceType};
pub use report::{CenterWalletMetrics, GraphOverview, Report, StageStatus, TopNode};
pub use risk::{RiskAssessment, RiskComponent, RiskLevel};
pub use taint::{TaintResult, TaintSeed};
