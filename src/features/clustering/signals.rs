//! §4.4 behavioral signal extractors: feePayer, fanPattern, temporal.

use std::collections::HashMap;

use crate::config::ClusteringConfig;
use crate::shared::models::{Address, EntitySignal, SignalKind, TxEdge};

fn signal(kind: SignalKind, addresses: Vec<Address>, strength: f64, edges: &[&TxEdge]) -> EntitySignal {
    EntitySignal {
        kind,
        addresses,
        strength: strength.min(1.0),
        evidence_txs: edges.iter().map(|e| e.tx_signature.clone()).collect(),
        metadata: HashMap::new(),
    }
}

/// Groups edges by assumed fee payer (`edge.from`); emits a signal for any
/// payer used at least `min_fee_payer_occurrences` times, linking that
/// payer to every distinct recipient it paid.
pub fn fee_payer_signals(edges: &[TxEdge], config: &ClusteringConfig) -> Vec<EntitySignal> {
    let mut by_payer: HashMap<&Address, Vec<&TxEdge>> = HashMap::new();
    for edge in edges {
        by_payer.entry(&edge.from).or_default().push(edge);
    }

    let mut out = Vec::new();
    for (payer, group) in by_payer {
        if group.len() < config.min_fee_payer_occurrences {
            continue;
        }
        let mut distinct: Vec<Address> = group.iter().map(|e| e.to.clone()).collect();
        distinct.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        distinct.dedup();
        let strength = (group.len() as f64 / 10.0).min(1.0) * (distinct.len() as f64 / 5.0).min(1.0);

        let mut addresses = vec![payer.clone()];
        addresses.extend(distinct);
        out.push(signal(SignalKind::FeePayer, addresses, strength, &group));
    }
    out
}

/// Buckets edges into `fan_pattern_window_seconds` windows; any bucket
/// with at least `fan_pattern_threshold` edges sharing a common address
/// emits a fan signal linking that address to its counterparties.
pub fn fan_pattern_signals(edges: &[TxEdge], config: &ClusteringConfig) -> Vec<EntitySignal> {
    if config.fan_pattern_window_seconds <= 0 {
        return Vec::new();
    }

    let mut buckets: HashMap<(i64, &Address), Vec<&TxEdge>> = HashMap::new();
    for edge in edges {
        let Some(block_time) = edge.block_time else { continue };
        let window = block_time.div_euclid(config.fan_pattern_window_seconds);
        buckets.entry((window, &edge.from)).or_default().push(edge);
        buckets.entry((window, &edge.to)).or_default().push(edge);
    }

    let mut out = Vec::new();
    for ((_, hub), group) in buckets {
        if group.len() < config.fan_pattern_threshold {
            continue;
        }
        let strength = group.len() as f64 / 20.0;
        let mut addresses: Vec<Address> = group
            .iter()
            .flat_map(|e| [e.from.clone(), e.to.clone()])
            .collect();
        addresses.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        addresses.dedup();
        let _ = hub;
        out.push(signal(SignalKind::FanPattern, addresses, strength, &group));
    }
    out
}

/// Buckets all edges by `temporal_window_seconds`; any bucket with at
/// least 3 edges and an address count in `[3, 15]` emits a temporal
/// co-activity signal.
pub fn temporal_signals(edges: &[TxEdge], config: &ClusteringConfig) -> Vec<EntitySignal> {
    if config.temporal_window_seconds <= 0 {
        return Vec::new();
    }

    let mut buckets: HashMap<i64, Vec<&TxEdge>> = HashMap::new();
    for edge in edges {
        let Some(block_time) = edge.block_time else { continue };
        let window = block_time.div_euclid(config.temporal_window_seconds);
        buckets.entry(window).or_default().push(edge);
    }

    let mut out = Vec::new();
    for group in buckets.into_values() {
        if group.len() < 3 {
            continue;
        }
        let mut addresses: Vec<Address> = group
            .iter()
            .flat_map(|e| [e.from.clone(), e.to.clone()])
            .collect();
        addresses.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        addresses.dedup();
        if !(3..=15).contains(&addresses.len()) {
            continue;
        }
        let v = addresses.len() as f64;
        let density = group.len() as f64 / (v * (v - 1.0).max(1.0));
        let strength = density / 3.0;
        out.push(signal(SignalKind::Temporal, addresses, strength, &group));
    }
    out
}

/// Runs all three extractors and concatenates their output.
pub fn extract_all(edges: &[TxEdge], config: &ClusteringConfig) -> Vec<EntitySignal> {
    let mut out = fee_payer_signals(edges, config);
    out.extend(fan_pattern_signals(edges, config));
    out.extend(temporal_signals(edges, config));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::{Direction, ProgramId, TxSignature};

    fn edge(from: &str, to: &str, value: f64, block_time: Option<i64>) -> TxEdge {
        TxEdge {
            from: Address::from(from),
            to: Address::from(to),
            value,
            slot: None,
            block_time,
            program: ProgramId::from("system"),
            tx_signature: TxSignature::from("sig"),
            direction: Direction::Neutral,
        }
    }

    #[test]
    fn fee_payer_signal_requires_minimum_occurrences() {
        let config = ClusteringConfig {
            min_fee_payer_occurrences: 2,
            ..ClusteringConfig::default()
        };
        let edges = vec![edge("A", "B", 1.0, None), edge("A", "C", 1.0, None)];
        let signals = fee_payer_signals(&edges, &config);
        assert_eq!(signals.len(), 1);
        assert!(signals[0].addresses.contains(&Address::from("A")));
        assert!(signals[0].addresses.contains(&Address::from("B")));
    }

    #[test]
    fn fee_payer_signal_absent_below_threshold() {
        let config = ClusteringConfig::default();
        let edges = vec![edge("A", "B", 1.0, None)];
        assert!(fee_payer_signals(&edges, &config).is_empty());
    }
}
