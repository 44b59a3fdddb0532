//! Error types for chainwitness.
//!
//! Mirrors the §7 error taxonomy: each stage returns a structured result
//! carrying issues rather than throwing; only `InvalidInput` and
//! `InternalInvariant` abort an investigation.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum ChainwitnessError {
    /// Malformed address, non-positive bounds, or other caller-supplied
    /// argument that cannot be acted on.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The chain client returned nothing usable (empty or all failures).
    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    /// A stage succeeded but a quality penalty applies (timeout, low parse
    /// rate, RPC fallback used). Carried as a warning, never aborts.
    #[error("partial data in stage {stage}: {reason}")]
    PartialData { stage: &'static str, reason: String },

    /// A §4 validator failed (e.g. an address in two clusters, a negative
    /// path value). Fatal — surfaces to the caller.
    #[error("internal invariant violated in {stage}: {detail}")]
    InternalInvariant { stage: &'static str, detail: String },

    /// The AI adapter or a persistence call failed. Never aborts the
    /// investigation; downgrades the relevant contribution instead.
    #[error("external dependency failed: {0}")]
    External(String),

    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl ChainwitnessError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn partial_data(stage: &'static str, reason: impl Into<String>) -> Self {
        Self::PartialData {
            stage,
            reason: reason.into(),
        }
    }

    pub fn internal_invariant(stage: &'static str, detail: impl Into<String>) -> Self {
        Self::InternalInvariant {
            stage,
            detail: detail.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ChainwitnessError>;
