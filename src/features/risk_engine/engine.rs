//! §4.9 final aggregation: weighted sum, level classification, and
//! recommendations.

use crate::config::RiskConfig;
use crate::shared::models::{RiskAssessment, RiskComponent, RiskLevel};

const DATA_QUALITY_COMPONENT: &str = "dataQualityPenalty";

/// Aggregates components into a [`RiskAssessment`]. `dataQualityPenalty`
/// is subtracted from the weighted sum of the other five rather than
/// added, per its subtractive weighting in §4.9.
pub fn aggregate(components: Vec<RiskComponent>, config: &RiskConfig) -> RiskAssessment {
    let total_weight: f64 = components.iter().map(|c| c.weight).sum();

    let (penalty_weighted, additive_weighted, confidence_weighted) = components.iter().fold((0.0, 0.0, 0.0), |(penalty, additive, confidence), c| {
        if c.name == DATA_QUALITY_COMPONENT {
            (penalty + c.score * c.weight, additive, confidence + c.confidence * c.weight)
        } else {
            (penalty, additive + c.score * c.weight, confidence + c.confidence * c.weight)
        }
    });

    let final_score = if total_weight > 0.0 {
        ((additive_weighted - penalty_weighted) / total_weight).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let confidence = if total_weight > 0.0 { (confidence_weighted / total_weight).clamp(0.0, 1.0) } else { 0.0 };

    let level = RiskLevel::classify(final_score, config.threshold_medium, config.threshold_high, config.threshold_critical);
    let flagged = !matches!(level, RiskLevel::Low);
    let assessment_quality = 1.0 - components.iter().find(|c| c.name == DATA_QUALITY_COMPONENT).map(|c| c.score).unwrap_or(0.0);
    let recommendations = recommend(&components, final_score);

    RiskAssessment {
        final_score,
        level,
        confidence,
        components,
        flagged,
        recommendations,
        assessment_quality,
        computation_meta: Default::default(),
    }
}

fn recommend(components: &[RiskComponent], final_score: f64) -> Vec<String> {
    let mut recommendations = Vec::new();
    for c in components {
        if c.threshold_breached {
            recommendations.push(format!("{} exceeded its critical threshold (score {:.2})", c.name, c.score));
        }
    }
    if final_score >= 0.85 {
        recommendations.push("escalate for manual review".to_string());
    }
    if let Some(quality) = components.iter().find(|c| c.name == DATA_QUALITY_COMPONENT) {
        if quality.score > 0.4 {
            recommendations.push("data quality issues may be understating this assessment".to_string());
        }
    }
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preset;
    use std::collections::HashMap;

    fn component(name: &'static str, score: f64, weight: f64) -> RiskComponent {
        RiskComponent { name, score, weight, confidence: 1.0, evidence: vec![], threshold_breached: false, raw_value: score, metadata: HashMap::new() }
    }

    #[test]
    fn all_zero_components_yield_low_level() {
        let config = Preset::Balanced.risk_config();
        let components: Vec<RiskComponent> = config.weights.keys().map(|k| component(Box::leak(k.clone().into_boxed_str()), 0.0, config.weights[k])).collect();
        let assessment = aggregate(components, &config);
        assert_eq!(assessment.level, RiskLevel::Low);
        assert!(!assessment.flagged);
    }

    #[test]
    fn data_quality_penalty_reduces_final_score() {
        let config = Preset::Balanced.risk_config();
        let mut components: Vec<RiskComponent> =
            config.weights.keys().filter(|k| k.as_str() != "dataQualityPenalty").map(|k| component(Box::leak(k.clone().into_boxed_str()), 1.0, config.weights[k])).collect();
        components.push(component("dataQualityPenalty", 1.0, config.weights["dataQualityPenalty"]));
        let assessment = aggregate(components, &config);
        assert!(assessment.final_score < 1.0);
    }

    #[test]
    fn threshold_breach_produces_a_recommendation() {
        let config = Preset::Balanced.risk_config();
        let mut components: Vec<RiskComponent> = config.weights.keys().map(|k| component(Box::leak(k.clone().into_boxed_str()), 0.1, config.weights[k])).collect();
        components[0].threshold_breached = true;
        let assessment = aggregate(components, &config);
        assert!(!assessment.recommendations.is_empty());
    }
}
