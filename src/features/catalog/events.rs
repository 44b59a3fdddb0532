//! §4.5 integration-event detectors: cashOut, bridgeOp, dexInteraction and
//! the suspicious-pattern detectors layered on top of them.

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::config::CatalogConfig;
use crate::shared::models::{
    Address, EventKind, IntegrationCatalogData, IntegrationEvent, ServiceType, TaintResult, TxEdge,
};

fn timestamp_for(edge: &TxEdge) -> DateTime<Utc> {
    edge.block_time
        .and_then(|t| Utc.timestamp_opt(t, 0).single())
        .unwrap_or_else(Utc::now)
}

fn taint_share_of<'a>(taint: &'a [TaintResult], addr: &Address) -> f64 {
    taint.iter().find(|r| &r.address == addr).map(|r| r.share).unwrap_or(0.0)
}

fn new_event(
    kind: EventKind,
    edge: &TxEdge,
    service: Option<crate::shared::models::ServiceEndpoint>,
    risk_score: f64,
    taint_ref: Option<Address>,
) -> IntegrationEvent {
    IntegrationEvent {
        id: Uuid::new_v4().to_string(),
        kind,
        timestamp: timestamp_for(edge),
        slot: edge.slot,
        addresses: vec![edge.from.clone(), edge.to.clone()],
        service_info: service,
        tx_signature: Some(edge.tx_signature.clone()),
        value: edge.value,
        metadata: HashMap::new(),
        risk_score: risk_score.clamp(0.0, 1.0),
        taint_ref,
    }
}

pub fn cash_out_events(edges: &[TxEdge], catalog: &IntegrationCatalogData, taint: &[TaintResult], config: &CatalogConfig) -> Vec<IntegrationEvent> {
    edges
        .iter()
        .filter_map(|edge| {
            let service = catalog.services.iter().find(|s| s.address == edge.to && s.r#type == ServiceType::Cex)?;
            if edge.value < config.min_cash_out_value {
                return None;
            }
            let taint_share = taint_share_of(taint, &edge.from);
            if taint_share < config.min_taint_threshold {
                return None;
            }
            let risk = 0.7 * taint_share + 0.3 * (edge.value / 1000.0).min(1.0);
            Some(new_event(EventKind::CashOut, edge, Some(service.clone()), risk, Some(edge.from.clone())))
        })
        .collect()
}

pub fn bridge_op_events(edges: &[TxEdge], catalog: &IntegrationCatalogData, config: &CatalogConfig) -> Vec<IntegrationEvent> {
    edges
        .iter()
        .filter_map(|edge| {
            if edge.value < config.min_bridge_value {
                return None;
            }
            let service = catalog
                .services
                .iter()
                .find(|s| (s.address == edge.from || s.address == edge.to) && s.r#type == ServiceType::Bridge)?;
            let risk = 0.4 + 0.4 * (edge.value / 500.0).min(1.0);
            Some(new_event(EventKind::BridgeOp, edge, Some(service.clone()), risk, None))
        })
        .collect()
}

pub fn dex_interaction_events(edges: &[TxEdge], catalog: &IntegrationCatalogData, config: &CatalogConfig) -> Vec<IntegrationEvent> {
    edges
        .iter()
        .filter_map(|edge| {
            if edge.value < config.min_dex_value {
                return None;
            }
            let service = catalog.services.iter().find(|s| s.address == edge.to && s.r#type == ServiceType::Dex)?;
            let risk = 0.2 + 0.3 * (edge.value / 100.0).min(1.0);
            Some(new_event(EventKind::DexInteraction, edge, Some(service.clone()), risk, None))
        })
        .collect()
}

/// Two cashOut events on the same address set within an hour, combined
/// value >= `rapid_cash_out_min_value`.
fn rapid_cash_out_events(cash_outs: &[IntegrationEvent], config: &CatalogConfig) -> Vec<IntegrationEvent> {
    let mut out = Vec::new();
    for i in 0..cash_outs.len() {
        for j in (i + 1)..cash_outs.len() {
            let (a, b) = (&cash_outs[i], &cash_outs[j]);
            let mut addrs_a = a.addresses.clone();
            let mut addrs_b = b.addresses.clone();
            addrs_a.sort_by(|x, y| x.as_str().cmp(y.as_str()));
            addrs_b.sort_by(|x, y| x.as_str().cmp(y.as_str()));
            if addrs_a != addrs_b {
                continue;
            }
            let gap = (a.timestamp - b.timestamp).num_seconds().abs();
            if gap > config.rapid_cash_out_window_seconds {
                continue;
            }
            if a.value + b.value < config.rapid_cash_out_min_value {
                continue;
            }
            out.push(IntegrationEvent {
                id: Uuid::new_v4().to_string(),
                kind: EventKind::SuspiciousPattern,
                timestamp: a.timestamp.max(b.timestamp),
                slot: a.slot.or(b.slot),
                addresses: addrs_a,
                service_info: a.service_info.clone(),
                tx_signature: a.tx_signature.clone(),
                value: a.value + b.value,
                metadata: HashMap::from([("pattern".to_string(), "rapidCashOut".to_string())]),
                risk_score: 0.8,
                taint_ref: a.taint_ref.clone(),
            });
        }
    }
    out
}

/// Cumulative event value divided by elapsed hours across the stream
/// exceeding `suspicious_velocity_threshold`.
fn high_velocity_event(events: &[IntegrationEvent], config: &CatalogConfig) -> Option<IntegrationEvent> {
    if events.len() < 2 {
        return None;
    }
    let earliest = events.iter().map(|e| e.timestamp).min()?;
    let latest = events.iter().map(|e| e.timestamp).max()?;
    let elapsed_hours = ((latest - earliest).num_seconds() as f64 / 3600.0).max(1.0 / 3600.0);
    let cumulative_value: f64 = events.iter().map(|e| e.value).sum();
    let velocity = cumulative_value / elapsed_hours;
    if velocity < config.suspicious_velocity_threshold {
        return None;
    }

    let risk = (0.6 + 0.3 * (velocity / config.suspicious_velocity_threshold)).min(1.0);
    Some(IntegrationEvent {
        id: Uuid::new_v4().to_string(),
        kind: EventKind::SuspiciousPattern,
        timestamp: latest,
        slot: None,
        addresses: events.iter().flat_map(|e| e.addresses.clone()).collect(),
        service_info: None,
        tx_signature: None,
        value: cumulative_value,
        metadata: HashMap::from([("pattern".to_string(), "highVelocity".to_string())]),
        risk_score: risk,
        taint_ref: None,
    })
}

/// Runs every detector and concatenates the resulting events.
pub fn detect_all(
    edges: &[TxEdge],
    catalog: &IntegrationCatalogData,
    taint: &[TaintResult],
    config: &CatalogConfig,
) -> Vec<IntegrationEvent> {
    let cash_outs = cash_out_events(edges, catalog, taint, config);
    let mut out = cash_outs.clone();
    out.extend(bridge_op_events(edges, catalog, config));
    out.extend(dex_interaction_events(edges, catalog, config));
    out.extend(rapid_cash_out_events(&cash_outs, config));
    if let Some(event) = high_velocity_event(&out, config) {
        out.push(event);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::{Direction, ProgramId, ServiceEndpoint, TxSignature};

    fn cex_catalog() -> IntegrationCatalogData {
        IntegrationCatalogData {
            version: "test".to_string(),
            last_updated: Utc::now(),
            services: vec![ServiceEndpoint {
                address: Address::from("X"),
                r#type: ServiceType::Cex,
                name: "Test CEX".to_string(),
                confidence: 1.0,
                last_verified: Utc::now(),
                metadata: Default::default(),
            }],
            sources: vec![],
        }
    }

    fn edge(from: &str, to: &str, value: f64) -> TxEdge {
        TxEdge {
            from: Address::from(from),
            to: Address::from(to),
            value,
            slot: Some(1),
            block_time: Some(1_700_000_000),
            program: ProgramId::from("system"),
            tx_signature: TxSignature::from("sig"),
            direction: Direction::Neutral,
        }
    }

    #[test]
    fn cash_out_requires_taint_and_value_thresholds() {
        let config = CatalogConfig {
            min_cash_out_value: 10.0,
            min_taint_threshold: 0.1,
            ..CatalogConfig::default()
        };
        let taint = vec![TaintResult {
            address: Address::from("A"),
            share: 0.3,
            hop: 1,
            incident_id: "i1".into(),
            path: vec![Address::from("seed"), Address::from("A")],
            total_flow: 20.0,
        }];
        let edges = vec![edge("A", "X", 20.0)];
        let events = cash_out_events(&edges, &cex_catalog(), &taint, &config);
        assert_eq!(events.len(), 1);
        assert!((events[0].risk_score - (0.7 * 0.3 + 0.3 * (20.0f64 / 1000.0).min(1.0))).abs() < 1e-9);
    }

    #[test]
    fn cash_out_absent_when_taint_too_low() {
        let config = CatalogConfig::default();
        let taint = vec![];
        let edges = vec![edge("A", "X", 20.0)];
        assert!(cash_out_events(&edges, &cex_catalog(), &taint, &config).is_empty());
    }
}
