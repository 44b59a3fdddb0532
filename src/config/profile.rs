//! §4.9 risk-scoring weights/thresholds and the named presets built on top
//! of them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::error::{ConfigError, ConfigResult};
use super::validation::Validatable;

/// Component weights for the six §4.9 risk components. Keys match
/// [`crate::features::risk_engine::components::COMPONENT_NAMES`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskConfig {
    pub weights: HashMap<String, f64>,
    pub threshold_medium: f64,
    pub threshold_high: f64,
    pub threshold_critical: f64,
    /// TaintProximity score above which `thresholdBreached` is set on the
    /// component, independent of the final weighted level.
    pub taint_critical_threshold: f64,
}

pub const COMPONENT_NAMES: [&str; 6] = [
    "taintProximity",
    "convergence",
    "controlSignals",
    "integrationEvents",
    "largeOutlierTx",
    "dataQualityPenalty",
];

impl RiskConfig {
    /// Renormalizes `weights` to sum to 1.0 when the drift is within 1%,
    /// in place. Larger drift is left for [`Validatable::validate`] to reject.
    pub fn normalize(&mut self) {
        let sum: f64 = self.weights.values().sum();
        if sum <= 0.0 {
            return;
        }
        let drift = (sum - 1.0).abs();
        if drift > 0.0 && drift <= 0.01 {
            for w in self.weights.values_mut() {
                *w /= sum;
            }
        }
    }
}

impl Validatable for RiskConfig {
    fn validate(&self) -> ConfigResult<()> {
        for name in COMPONENT_NAMES {
            if !self.weights.contains_key(name) {
                return Err(ConfigError::UnknownProfile(format!(
                    "missing weight for component {name}"
                )));
            }
        }
        let sum: f64 = self.weights.values().sum();
        if (sum - 1.0).abs() > 0.001 {
            return Err(ConfigError::WeightsDoNotSumToOne { actual: sum });
        }
        if !(self.threshold_medium < self.threshold_high && self.threshold_high < self.threshold_critical)
        {
            return Err(ConfigError::ThresholdsNotMonotone {
                medium: self.threshold_medium,
                high: self.threshold_high,
                critical: self.threshold_critical,
            });
        }
        for (field, value) in [
            ("thresholdMedium", self.threshold_medium),
            ("thresholdHigh", self.threshold_high),
            ("thresholdCritical", self.threshold_critical),
            ("taintCriticalThreshold", self.taint_critical_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange { field, value });
            }
        }
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "RiskConfig"
    }
}

fn weights(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

/// §4.9 named investigative presets. Each carries its own [`RiskConfig`]
/// plus per-stage parameter overrides layered over stage defaults.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    Balanced,
    TaintFocused,
    Behavioral,
    FinancialCrime,
    HighVolume,
    Conservative,
}

impl Preset {
    pub fn all() -> [Preset; 6] {
        [
            Preset::Balanced,
            Preset::TaintFocused,
            Preset::Behavioral,
            Preset::FinancialCrime,
            Preset::HighVolume,
            Preset::Conservative,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Balanced => "balanced",
            Preset::TaintFocused => "taint_focused",
            Preset::Behavioral => "behavioral",
            Preset::FinancialCrime => "financial_crime",
            Preset::HighVolume => "high_volume",
            Preset::Conservative => "conservative",
        }
    }

    pub fn parse(name: &str) -> ConfigResult<Preset> {
        Preset::all()
            .into_iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| ConfigError::UnknownProfile(name.to_string()))
    }

    pub fn risk_config(&self) -> RiskConfig {
        match self {
            Preset::Balanced => RiskConfig {
                weights: weights(&[
                    ("taintProximity", 0.30),
                    ("convergence", 0.20),
                    ("controlSignals", 0.15),
                    ("integrationEvents", 0.20),
                    ("largeOutlierTx", 0.10),
                    ("dataQualityPenalty", 0.05),
                ]),
                threshold_medium: 0.3,
                threshold_high: 0.6,
                threshold_critical: 0.85,
                taint_critical_threshold: 0.5,
            },
            Preset::TaintFocused => RiskConfig {
                weights: weights(&[
                    ("taintProximity", 0.50),
                    ("convergence", 0.15),
                    ("controlSignals", 0.10),
                    ("integrationEvents", 0.15),
                    ("largeOutlierTx", 0.05),
                    ("dataQualityPenalty", 0.05),
                ]),
                threshold_medium: 0.25,
                threshold_high: 0.55,
                threshold_critical: 0.8,
                taint_critical_threshold: 0.35,
            },
            Preset::Behavioral => RiskConfig {
                weights: weights(&[
                    ("taintProximity", 0.15),
                    ("convergence", 0.30),
                    ("controlSignals", 0.30),
                    ("integrationEvents", 0.10),
                    ("largeOutlierTx", 0.10),
                    ("dataQualityPenalty", 0.05),
                ]),
                threshold_medium: 0.3,
                threshold_high: 0.6,
                threshold_critical: 0.85,
                taint_critical_threshold: 0.5,
            },
            Preset::FinancialCrime => RiskConfig {
                weights: weights(&[
                    ("taintProximity", 0.30),
                    ("convergence", 0.15),
                    ("controlSignals", 0.10),
                    ("integrationEvents", 0.35),
                    ("largeOutlierTx", 0.05),
                    ("dataQualityPenalty", 0.05),
                ]),
                threshold_medium: 0.2,
                threshold_high: 0.5,
                threshold_critical: 0.75,
                taint_critical_threshold: 0.4,
            },
            Preset::HighVolume => RiskConfig {
                weights: weights(&[
                    ("taintProximity", 0.20),
                    ("convergence", 0.25),
                    ("controlSignals", 0.10),
                    ("integrationEvents", 0.15),
                    ("largeOutlierTx", 0.25),
                    ("dataQualityPenalty", 0.05),
                ]),
                threshold_medium: 0.35,
                threshold_high: 0.65,
                threshold_critical: 0.88,
                taint_critical_threshold: 0.55,
            },
            Preset::Conservative => RiskConfig {
                weights: weights(&[
                    ("taintProximity", 0.30),
                    ("convergence", 0.20),
                    ("controlSignals", 0.15),
                    ("integrationEvents", 0.20),
                    ("largeOutlierTx", 0.10),
                    ("dataQualityPenalty", 0.05),
                ]),
                threshold_medium: 0.15,
                threshold_high: 0.4,
                threshold_critical: 0.65,
                taint_critical_threshold: 0.3,
            },
        }
    }
}

impl Default for Preset {
    fn default() -> Self {
        Preset::Balanced
    }
}

/// Loose classification of what an investigation is chasing; narrower than
/// a free-text description but enough to steer preset selection.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum InvestigationType {
    VictimRecovery,
    FinancialCrime,
    Routine,
}

/// Picks a preset from investigation context (§4.9 recommender), used by
/// the CLI when `--profile` is omitted.
pub fn recommend_preset(
    has_incident: bool,
    has_cex_interactions: bool,
    max_value: f64,
    transaction_count: usize,
    investigation_type: InvestigationType,
) -> Preset {
    if investigation_type == InvestigationType::VictimRecovery && has_incident {
        Preset::TaintFocused
    } else if investigation_type == InvestigationType::FinancialCrime || (has_incident && has_cex_interactions) {
        Preset::FinancialCrime
    } else if transaction_count > 2_000 || max_value > 1_000_000.0 {
        Preset::HighVolume
    } else if has_incident {
        Preset::TaintFocused
    } else {
        Preset::Balanced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_preset_validates() {
        for preset in Preset::all() {
            preset.risk_config().validate().unwrap();
        }
    }

    #[test]
    fn normalize_fixes_small_drift() {
        let mut cfg = Preset::Balanced.risk_config();
        *cfg.weights.get_mut("taintProximity").unwrap() += 0.005;
        cfg.normalize();
        let sum: f64 = cfg.weights.values().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn parse_round_trips_through_name() {
        for preset in Preset::all() {
            assert_eq!(Preset::parse(preset.name()).unwrap(), preset);
        }
    }

    #[test]
    fn unknown_preset_name_errors() {
        assert!(Preset::parse("nonexistent").is_err());
    }
}
