//! Per-stage parameter configs (§4.2–§4.8), one struct per pipeline
//! stage.

use serde::{Deserialize, Serialize};

use super::error::ConfigResult;
use super::validation::{check_unit_range, Validatable};

/// §4.2 TaintPropagation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaintConfig {
    pub decay_factor: f64,
    pub dust_threshold: f64,
    pub max_hops: u32,
    pub min_value_threshold: f64,
}

impl Default for TaintConfig {
    fn default() -> Self {
        Self {
            decay_factor: 0.8,
            dust_threshold: 0.001,
            max_hops: 6,
            min_value_threshold: 0.01,
        }
    }
}

impl Validatable for TaintConfig {
    fn validate(&self) -> ConfigResult<()> {
        check_unit_range("decayFactor", self.decay_factor)?;
        check_unit_range("dustThreshold", self.dust_threshold)?;
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "TaintConfig"
    }
}

/// §4.3 TaintCache policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaintCacheConfig {
    pub ttl_hours: u64,
    pub max_size: usize,
    pub persist_to_disk: bool,
    pub graph_hash_sample_n: usize,
}

impl Default for TaintCacheConfig {
    fn default() -> Self {
        Self {
            ttl_hours: 24,
            max_size: 4096,
            persist_to_disk: false,
            graph_hash_sample_n: 64,
        }
    }
}

impl Validatable for TaintCacheConfig {
    fn validate(&self) -> ConfigResult<()> {
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "TaintCacheConfig"
    }
}

/// §4.4 EntityClustering parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusteringConfig {
    pub min_fee_payer_occurrences: usize,
    pub fan_pattern_window_seconds: i64,
    pub fan_pattern_threshold: usize,
    pub temporal_window_seconds: i64,
    pub min_signal_strength: f64,
    pub max_cluster_size: usize,
    pub min_cluster_confidence: f64,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            min_fee_payer_occurrences: 3,
            fan_pattern_window_seconds: 300,
            fan_pattern_threshold: 5,
            temporal_window_seconds: 3600,
            min_signal_strength: 0.2,
            max_cluster_size: 50,
            min_cluster_confidence: 0.3,
        }
    }
}

impl Validatable for ClusteringConfig {
    fn validate(&self) -> ConfigResult<()> {
        check_unit_range("minSignalStrength", self.min_signal_strength)?;
        check_unit_range("minClusterConfidence", self.min_cluster_confidence)?;
        if self.max_cluster_size < 2 {
            return Err(super::error::ConfigError::OutOfRange {
                field: "maxClusterSize",
                value: self.max_cluster_size as f64,
            });
        }
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "ClusteringConfig"
    }
}

/// §4.5 IntegrationCatalog & event-detector thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogConfig {
    pub catalog_path: Option<String>,
    pub update_interval_hours: u64,
    pub min_cash_out_value: f64,
    pub min_taint_threshold: f64,
    pub min_bridge_value: f64,
    pub min_dex_value: f64,
    pub rapid_cash_out_window_seconds: i64,
    pub rapid_cash_out_min_value: f64,
    pub suspicious_velocity_threshold: f64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            catalog_path: None,
            update_interval_hours: 24,
            min_cash_out_value: 10.0,
            min_taint_threshold: 0.1,
            min_bridge_value: 1.0,
            min_dex_value: 5.0,
            rapid_cash_out_window_seconds: 3600,
            rapid_cash_out_min_value: 50.0,
            suspicious_velocity_threshold: 100.0,
        }
    }
}

impl Validatable for CatalogConfig {
    fn validate(&self) -> ConfigResult<()> {
        check_unit_range("minTaintThreshold", self.min_taint_threshold)?;
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "CatalogConfig"
    }
}

/// §4.6 Explainability (k-shortest paths) parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainabilityConfig {
    pub k: usize,
    pub max_hops: u32,
    pub min_path_value: f64,
    pub weight_hops: f64,
    pub weight_value: f64,
    pub weight_time: f64,
    pub weight_taint_boost_enabled: bool,
    pub top_n_anchors: usize,
    pub top_n_results: usize,
}

impl Default for ExplainabilityConfig {
    fn default() -> Self {
        Self {
            k: 3,
            max_hops: 6,
            min_path_value: 0.1,
            weight_hops: 0.3,
            weight_value: 0.4,
            weight_time: 0.3,
            weight_taint_boost_enabled: true,
            top_n_anchors: 10,
            top_n_results: 20,
        }
    }
}

impl Validatable for ExplainabilityConfig {
    fn validate(&self) -> ConfigResult<()> {
        let sum = self.weight_hops + self.weight_value + self.weight_time;
        if (sum - 1.0).abs() > 0.01 {
            return Err(super::error::ConfigError::WeightsDoNotSumToOne { actual: sum });
        }
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "ExplainabilityConfig"
    }
}

/// §4.7 FlowAttribution parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowConfig {
    pub base_unit_cost: f64,
    pub taint_delta_cost_weight: f64,
    pub bridge_program_penalty: f64,
    pub default_program_penalty: f64,
    pub time_budget_seconds: u64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            base_unit_cost: 0.001,
            taint_delta_cost_weight: 0.1,
            bridge_program_penalty: 0.005,
            default_program_penalty: 0.001,
            time_budget_seconds: 30,
        }
    }
}

impl Validatable for FlowConfig {
    fn validate(&self) -> ConfigResult<()> {
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "FlowConfig"
    }
}

/// §4.8 InfluenceAnalysis parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfluenceConfig {
    pub max_prioritised_addresses: usize,
}

impl Default for InfluenceConfig {
    fn default() -> Self {
        Self {
            max_prioritised_addresses: 25,
        }
    }
}

impl Validatable for InfluenceConfig {
    fn validate(&self) -> ConfigResult<()> {
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "InfluenceConfig"
    }
}
