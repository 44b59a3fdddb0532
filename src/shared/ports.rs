//! Domain ports — interfaces for the external collaborators §1/§6 place
//! out of core scope. The core depends on these traits, never on concrete
//! RPC/HTTP/AI clients.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::models::{Address, ProgramId, Slot, TxEdge, TxSignature, UnixSeconds};

/// Signature metadata as returned by `getSignaturesFor`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureInfo {
    pub signature: TxSignature,
    pub slot: Slot,
    pub block_time: Option<UnixSeconds>,
}

/// A structured transaction as returned by `getTransactionDetails`, before
/// it is parsed into [`TxEdge`]s (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionDetails {
    pub signature: TxSignature,
    pub slot: Slot,
    pub block_time: Option<UnixSeconds>,
    pub account_keys: Vec<Address>,
    pub programs: Vec<ProgramId>,
    pub fee: u64,
    pub status_ok: bool,
    pub pre_balances: Vec<u64>,
    pub post_balances: Vec<u64>,
    /// Edges already extracted by a program-aware extractor, when the
    /// client can do so; the driver falls back to balance-delta parsing
    /// otherwise. Extraction itself is out of core scope (§6).
    pub edges: Vec<TxEdge>,
}

/// Port: chain RPC client (driven port). Infrastructure outside the core
/// implements this against a real Solana-style RPC endpoint; tests
/// implement it with an in-memory fake.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn get_signatures_for(
        &self,
        address: &Address,
        limit: usize,
    ) -> Result<Vec<SignatureInfo>, String>;

    async fn get_transaction_details(
        &self,
        signature: &TxSignature,
    ) -> Result<TransactionDetails, String>;
}

/// One-shot AI-assistance completion result (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiAssessment {
    pub risk_score: f64,
    pub insights: String,
    pub suspicious_patterns: Vec<String>,
}

/// Port: AI adapter (driven port, optional). Retries are the caller's
/// responsibility via [`AiAdapter::complete_with_retry`]; failures never
/// fail the whole analysis (§6).
#[async_trait]
pub trait AiAdapter: Send + Sync {
    async fn complete(&self, prompt_json: &str) -> Result<AiAssessment, String>;

    async fn complete_with_retry(&self, prompt_json: &str, max_retries: u32) -> Option<AiAssessment> {
        let mut attempt = 0;
        loop {
            match self.complete(prompt_json).await {
                Ok(assessment) => return Some(assessment),
                Err(err) => {
                    tracing::warn!(attempt, %err, "ai adapter call failed");
                    if attempt >= max_retries {
                        return None;
                    }
                    let backoff_ms = 100u64 * (1u64 << attempt.min(10));
                    tokio::time::sleep(std::time::Duration::from_millis(backoff_ms)).await;
                    attempt += 1;
                }
            }
        }
    }
}
