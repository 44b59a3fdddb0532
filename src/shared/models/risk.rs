//! §3 `RiskComponent` / `RiskAssessment` (§4.9 risk engine).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn classify(score: f64, medium: f64, high: f64, critical: f64) -> Self {
        if score >= critical {
            RiskLevel::Critical
        } else if score >= high {
            RiskLevel::High
        } else if score >= medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskComponent {
    pub name: &'static str,
    /// `[0, 1]`.
    pub score: f64,
    /// `[0, 1]`.
    pub weight: f64,
    /// `[0, 1]`.
    pub confidence: f64,
    pub evidence: Vec<String>,
    pub threshold_breached: bool,
    pub raw_value: f64,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// `[0, 1]`.
    pub final_score: f64,
    pub level: RiskLevel,
    pub confidence: f64,
    pub components: Vec<RiskComponent>,
    pub flagged: bool,
    pub recommendations: Vec<String>,
    pub assessment_quality: f64,
    pub computation_meta: HashMap<String, String>,
}
