//! §3 `EntitySignal` / `EntityCluster` (§4.4 clustering).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::address::{Address, TxSignature};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SignalKind {
    FeePayer,
    FanPattern,
    Temporal,
    TokenAccount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySignal {
    pub kind: SignalKind,
    /// Addresses this signal evidences as co-controlled.
    pub addresses: Vec<Address>,
    /// Strength in `[0, 1]`.
    pub strength: f64,
    pub evidence_txs: Vec<TxSignature>,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityCluster {
    pub id: String,
    /// Size in `[2, maxClusterSize]`.
    pub addresses: Vec<Address>,
    pub signals: Vec<EntitySignal>,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}
