//! §4.6 path scoring: hops/value/temporal components, weighted sum, and
//! the optional taint boost.

use crate::config::ExplainabilityConfig;
use crate::shared::models::{Address, TaintResult, TxEdge};

pub fn taint_involvement(segments: &[TxEdge], taint: &[TaintResult]) -> f64 {
    if segments.is_empty() {
        return 0.0;
    }
    let mut addresses: Vec<&Address> = segments.iter().flat_map(|e| [&e.from, &e.to]).collect();
    addresses.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    addresses.dedup();

    let shares: Vec<f64> = addresses
        .iter()
        .filter_map(|addr| taint.iter().find(|r| &&r.address == addr).map(|r| r.share))
        .collect();
    if shares.is_empty() {
        0.0
    } else {
        shares.iter().sum::<f64>() / shares.len() as f64
    }
}

fn hops_score(hops: u32, max_hops: u32) -> f64 {
    if max_hops == 0 {
        return 0.0;
    }
    (1.0 - hops as f64 / max_hops as f64).max(0.0)
}

fn value_score(total_value: f64) -> f64 {
    (total_value / 100.0).min(1.0)
}

fn temporal_score(segments: &[TxEdge]) -> f64 {
    let timed: Vec<&TxEdge> = segments.iter().filter(|e| e.block_time.is_some()).collect();
    if timed.len() < 2 {
        return 1.0;
    }

    let mut violations = 0usize;
    let mut max_gap = 0i64;
    for window in timed.windows(2) {
        let (a, b) = (window[0].block_time.unwrap(), window[1].block_time.unwrap());
        if b < a {
            violations += 1;
        }
        max_gap = max_gap.max((b - a).abs());
    }

    let consistency = 1.0 - violations as f64 / timed.len() as f64;
    let proximity = (1.0 - max_gap as f64 / 86_400.0).max(0.0);
    (consistency + proximity) / 2.0
}

/// §4.6 combined path score, pre-boost.
pub fn path_score(hops: u32, total_value: f64, segments: &[TxEdge], config: &ExplainabilityConfig) -> f64 {
    let hops_s = hops_score(hops, config.max_hops);
    let value_s = value_score(total_value);
    let temporal_s = temporal_score(segments);
    config.weight_hops * hops_s + config.weight_value * value_s + config.weight_time * temporal_s
}

/// Applies the `(1 + taintInvolvement * 0.5)` boost when enabled.
pub fn boosted_score(base_score: f64, taint_involvement: f64, config: &ExplainabilityConfig) -> f64 {
    if config.weight_taint_boost_enabled {
        base_score * (1.0 + taint_involvement * 0.5)
    } else {
        base_score
    }
}
