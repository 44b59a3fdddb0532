//! §3 `ServiceEndpoint` / `IntegrationCatalog` / `IntegrationEvent` (§4.5).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::address::{Address, TxSignature};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Cex,
    Bridge,
    Gateway,
    Dex,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    pub address: Address,
    #[serde(rename = "service_type")]
    pub r#type: ServiceType,
    #[serde(rename = "service_name")]
    pub name: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    pub last_verified: DateTime<Utc>,
    pub metadata: HashMap<String, String>,
}

/// On-disk/in-memory catalog document, §6 shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationCatalogData {
    pub version: String,
    pub last_updated: DateTime<Utc>,
    pub services: Vec<ServiceEndpoint>,
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    CashOut,
    BridgeOp,
    DexInteraction,
    SuspiciousPattern,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationEvent {
    pub id: String,
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
    pub slot: Option<u64>,
    pub addresses: Vec<Address>,
    pub service_info: Option<ServiceEndpoint>,
    pub tx_signature: Option<TxSignature>,
    pub value: f64,
    pub metadata: HashMap<String, String>,
    /// Risk in `[0, 1]`.
    pub risk_score: f64,
    pub taint_ref: Option<Address>,
}
