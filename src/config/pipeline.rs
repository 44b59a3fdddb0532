//! Aggregate pipeline configuration: one [`RiskConfig`] plus the per-stage
//! parameter structs, assembled from a [`Preset`] and optionally patched by
//! a user-supplied override file (§4.9).

use serde::{Deserialize, Serialize};

use super::error::ConfigResult;
use super::profile::{Preset, RiskConfig};
use super::stage::{
    CatalogConfig, ClusteringConfig, ExplainabilityConfig, FlowConfig, InfluenceConfig, TaintCacheConfig,
    TaintConfig,
};
use super::validation::Validatable;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    pub preset: Preset,
    pub risk: RiskConfig,
    pub taint: TaintConfig,
    pub taint_cache: TaintCacheConfig,
    pub clustering: ClusteringConfig,
    pub catalog: CatalogConfig,
    pub explainability: ExplainabilityConfig,
    pub flow: FlowConfig,
    pub influence: InfluenceConfig,
}

impl PipelineConfig {
    pub fn from_preset(preset: Preset) -> Self {
        Self {
            preset,
            risk: preset.risk_config(),
            taint: TaintConfig::default(),
            taint_cache: TaintCacheConfig::default(),
            clustering: ClusteringConfig::default(),
            catalog: CatalogConfig::default(),
            explainability: ExplainabilityConfig::default(),
            flow: FlowConfig::default(),
            influence: InfluenceConfig::default(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from_preset(Preset::default())
    }
}

impl Validatable for PipelineConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.risk.validate()?;
        self.taint.validate()?;
        self.taint_cache.validate()?;
        self.clustering.validate()?;
        self.catalog.validate()?;
        self.explainability.validate()?;
        self.flow.validate()?;
        self.influence.validate()?;
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "PipelineConfig"
    }
}
