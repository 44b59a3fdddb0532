//! §4.9 risk components: six scores in `[0, 1]` plus the subtractive
//! data-quality penalty, each packaged as a [`RiskComponent`].

use std::collections::HashMap;

use crate::config::profile::COMPONENT_NAMES;
use crate::config::RiskConfig;
use crate::features::graph_builder::{fan_in, fan_out, net_flow};
use crate::features::taint_propagation::TaintMetrics;
use crate::shared::models::{Address, EntityCluster, IntegrationEvent, RiskComponent, SignalKind, TaintResult, TxGraph};

/// External signals about the data-fetch stage that produced `graph`,
/// fed into [`data_quality_penalty`]. Not derivable from the graph
/// itself.
#[derive(Debug, Clone, Copy)]
pub struct DataQualityInputs {
    pub timestamp_ok: bool,
    pub delta_ok: bool,
    /// `[0, 1]`.
    pub rpc_fallback_ratio: f64,
    /// `[0, 1]`.
    pub parse_success_rate: f64,
}

impl Default for DataQualityInputs {
    fn default() -> Self {
        DataQualityInputs { timestamp_ok: true, delta_ok: true, rpc_fallback_ratio: 0.0, parse_success_rate: 1.0 }
    }
}

fn component(name: &'static str, score: f64, weight: f64, confidence: f64, raw_value: f64, evidence: Vec<String>, threshold_breached: bool) -> RiskComponent {
    RiskComponent {
        name,
        score: score.clamp(0.0, 1.0),
        weight,
        confidence: confidence.clamp(0.0, 1.0),
        evidence,
        threshold_breached,
        raw_value,
        metadata: HashMap::new(),
    }
}

fn weight_of(config: &RiskConfig, name: &str) -> f64 {
    config.weights.get(name).copied().unwrap_or(0.0)
}

/// §4.9 TaintProximity: `0.6·min(1,taintShare·2) + 0.25·max(0,1−(hop−1)·0.2)
/// + 0.15·min(1,maxTaintScore)`. `thresholdBreached` fires above
/// `taintCriticalThreshold`.
pub fn taint_proximity(target: &Address, taint: &[TaintResult], metrics: &TaintMetrics, config: &RiskConfig) -> RiskComponent {
    let own = taint.iter().find(|r| &r.address == target);
    let (share, hop) = own.map(|r| (r.share, r.hop)).unwrap_or((0.0, 0));

    let exposure_term = (share * 2.0).min(1.0);
    let hop_term = (1.0 - (hop as f64 - 1.0) * 0.2).max(0.0).min(1.0);
    let severity_term = metrics.max_share.min(1.0);
    let score = 0.6 * exposure_term + 0.25 * hop_term + 0.15 * severity_term;

    let mut evidence = Vec::new();
    if let Some(r) = own {
        evidence.push(format!("taint share {:.3} at hop {}", r.share, r.hop));
    } else {
        evidence.push("no taint propagation reached this address".to_string());
    }

    component(
        "taintProximity",
        score,
        weight_of(config, "taintProximity"),
        if own.is_some() { 1.0 } else { 0.6 },
        share,
        evidence,
        score > config.taint_critical_threshold,
    )
}

/// §4.9 Convergence: `0.4·sinkConc + 0.3·fanOut + 0.3·fanIn`, all
/// normalised against a fixed cap so single large wallets don't always
/// saturate at 1.
pub fn convergence(graph: &TxGraph, target: &Address, config: &RiskConfig) -> RiskComponent {
    const FAN_NORMALISATION_CAP: f64 = 20.0;

    let out_stats = fan_out(graph, target);
    let in_stats = fan_in(graph, target);

    let sink_concentration = if out_stats.total_value > 0.0 { out_stats.max_value / out_stats.total_value } else { 0.0 };
    let fan_out_ratio = (out_stats.count as f64 / FAN_NORMALISATION_CAP).min(1.0);
    let fan_in_ratio = (in_stats.count as f64 / FAN_NORMALISATION_CAP).min(1.0);

    let score = 0.4 * sink_concentration + 0.3 * fan_out_ratio + 0.3 * fan_in_ratio;
    let evidence = vec![format!(
        "sinkConc={sink_concentration:.2} fanOut={}/{FAN_NORMALISATION_CAP} fanIn={}/{FAN_NORMALISATION_CAP}",
        out_stats.count, in_stats.count
    )];

    component("convergence", score, weight_of(config, "convergence"), 1.0, net_flow(graph, target).net_flow, evidence, false)
}

/// §4.9 ControlSignals: `0.5·feePayerConcentration + 0.3·temporalBurstRatio
/// + 0.2·programConcentration`, the first two read off the strongest
/// matching clustering signal that names `target`, the last computed
/// directly over incident edges.
pub fn control_signals(graph: &TxGraph, target: &Address, clusters: &[EntityCluster], config: &RiskConfig) -> RiskComponent {
    let strongest = |kind: SignalKind| -> f64 {
        clusters
            .iter()
            .flat_map(|c| &c.signals)
            .filter(|s| s.kind == kind && s.addresses.contains(target))
            .map(|s| s.strength)
            .fold(0.0, f64::max)
    };

    let fee_payer_concentration = strongest(SignalKind::FeePayer);
    let temporal_burst_ratio = strongest(SignalKind::Temporal);

    let mut program_counts: HashMap<&str, usize> = HashMap::new();
    let mut incident = 0usize;
    for edge in graph.out_edges(target).chain(graph.in_edges(target)) {
        *program_counts.entry(edge.program.as_str()).or_insert(0) += 1;
        incident += 1;
    }
    let program_concentration = if incident > 0 {
        program_counts.values().copied().max().unwrap_or(0) as f64 / incident as f64
    } else {
        0.0
    };

    let score = 0.5 * fee_payer_concentration + 0.3 * temporal_burst_ratio + 0.2 * program_concentration;
    let evidence = vec![format!(
        "feePayer={fee_payer_concentration:.2} temporalBurst={temporal_burst_ratio:.2} programConc={program_concentration:.2}"
    )];

    component("controlSignals", score, weight_of(config, "controlSignals"), 1.0, program_concentration, evidence, false)
}

/// §4.9 IntegrationEvents: `riskRatio = (2·high + medium)/(2·total)`,
/// `score = min(1, 0.7·riskRatio + 0.3·min(1,totalValue/1000))`. Events
/// are bucketed high/medium by `risk_score` thresholds, since events
/// carry a continuous score rather than a pre-baked tier.
pub fn integration_events(target: &Address, events: &[IntegrationEvent], config: &RiskConfig) -> RiskComponent {
    let relevant: Vec<&IntegrationEvent> = events.iter().filter(|e| e.addresses.contains(target)).collect();
    if relevant.is_empty() {
        return component("integrationEvents", 0.0, weight_of(config, "integrationEvents"), 0.5, 0.0, vec!["no integration events".to_string()], false);
    }

    let high = relevant.iter().filter(|e| e.risk_score >= 0.7).count();
    let medium = relevant.iter().filter(|e| (0.4..0.7).contains(&e.risk_score)).count();
    let total = relevant.len();
    let risk_ratio = (2 * high + medium) as f64 / (2 * total) as f64;
    let total_value: f64 = relevant.iter().map(|e| e.value).sum();

    let score = (0.7 * risk_ratio + 0.3 * (total_value / 1000.0).min(1.0)).min(1.0);
    let evidence = vec![format!("{total} events, {high} high-risk, {medium} medium-risk, value {total_value:.2}")];

    component("integrationEvents", score, weight_of(config, "integrationEvents"), 1.0, risk_ratio, evidence, false)
}

/// §4.9 LargeOutlierTx: z-score of the target's net flow against the
/// graph's net-flow distribution, plus a size factor, `score =
/// max(outlierScore, 0.8·sizeFactor)`.
pub fn large_outlier_tx(graph: &TxGraph, target: &Address, config: &RiskConfig) -> RiskComponent {
    let samples: Vec<f64> = graph.nodes().iter().map(|a| net_flow(graph, a).net_flow.abs()).collect();
    if samples.is_empty() {
        return component("largeOutlierTx", 0.0, weight_of(config, "largeOutlierTx"), 0.5, 0.0, vec!["empty graph".to_string()], false);
    }

    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    let variance = samples.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / samples.len() as f64;
    let std_dev = variance.sqrt();
    let max = samples.iter().cloned().fold(0.0, f64::max);

    let z = if std_dev > 1e-9 { (max - mean) / std_dev } else { 0.0 };
    let outlier_score = if z < 1.0 {
        0.0
    } else if z < 3.0 {
        (z - 1.0) / 2.0
    } else {
        1.0
    };

    let target_flow = net_flow(graph, target).net_flow.abs();
    let size_factor = (target_flow / 10_000.0).min(1.0);
    let score = outlier_score.max(0.8 * size_factor);

    let evidence = vec![format!("z={z:.2} sizeFactor={size_factor:.2}")];
    component("largeOutlierTx", score, weight_of(config, "largeOutlierTx"), 1.0, z, evidence, false)
}

/// §4.9 DataQualityPenalty: subtractive, `0.3` for a bad timestamp source,
/// `0.2` for a failed balance-delta check, up to `0.3` from RPC
/// fallbacks, and `(1 − parseSuccessRate)·0.4` below a 0.9 parse rate.
pub fn data_quality_penalty(inputs: &DataQualityInputs, config: &RiskConfig) -> RiskComponent {
    let mut penalty = 0.0;
    let mut evidence = Vec::new();

    if !inputs.timestamp_ok {
        penalty += 0.3;
        evidence.push("timestamps unreliable".to_string());
    }
    if !inputs.delta_ok {
        penalty += 0.2;
        evidence.push("balance-delta reconciliation failed".to_string());
    }
    penalty += inputs.rpc_fallback_ratio.clamp(0.0, 1.0) * 0.3;
    if inputs.parse_success_rate < 0.9 {
        let term = (1.0 - inputs.parse_success_rate) * 0.4;
        penalty += term;
        evidence.push(format!("parse success rate {:.2}", inputs.parse_success_rate));
    }
    if evidence.is_empty() {
        evidence.push("no data quality issues detected".to_string());
    }

    component("dataQualityPenalty", penalty.min(1.0), weight_of(config, "dataQualityPenalty"), 1.0, penalty, evidence, false)
}

/// Runs every component and returns them in [`COMPONENT_NAMES`] order.
pub fn all_components(
    graph: &TxGraph,
    target: &Address,
    taint: &[TaintResult],
    taint_metrics: &TaintMetrics,
    clusters: &[EntityCluster],
    events: &[IntegrationEvent],
    data_quality: &DataQualityInputs,
    config: &RiskConfig,
) -> Vec<RiskComponent> {
    let components = vec![
        taint_proximity(target, taint, taint_metrics, config),
        convergence(graph, target, config),
        control_signals(graph, target, clusters, config),
        integration_events(target, events, config),
        large_outlier_tx(graph, target, config),
        data_quality_penalty(data_quality, config),
    ];
    debug_assert_eq!(components.len(), COMPONENT_NAMES.len());
    components
}
