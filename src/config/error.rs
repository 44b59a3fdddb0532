//! Configuration error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("weights must sum to 1.0 (+-0.001); got {actual}")]
    WeightsDoNotSumToOne { actual: f64 },

    #[error("thresholds must satisfy medium < high < critical; got {medium}, {high}, {critical}")]
    ThresholdsNotMonotone {
        medium: f64,
        high: f64,
        critical: f64,
    },

    #[error("field {field} must be in [0,1]; got {value}")]
    OutOfRange { field: &'static str, value: f64 },

    #[error("unknown profile: {0}")]
    UnknownProfile(String),

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(String),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
