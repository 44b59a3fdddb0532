//! End-to-end scenarios (§8) run through the real fork-join driver rather
//! than through any single stage in isolation.

use std::time::{Duration, Instant};

use chainwitness::config::PipelineConfig;
use chainwitness::features::risk_engine::DataQualityInputs;
use chainwitness::pipeline::{run_from_graph, InvestigationState};
use chainwitness::shared::models::{
    Address, Direction, GraphBuilder, IncidentId, IntegrationCatalogData, ProgramId, ServiceEndpoint, ServiceType,
    TaintSeed, TxEdge, TxSignature,
};

fn edge(from: &str, to: &str, value: f64, block_time: i64) -> TxEdge {
    TxEdge {
        from: Address::from(from),
        to: Address::from(to),
        value,
        slot: None,
        block_time: Some(block_time),
        program: ProgramId::from("system"),
        tx_signature: TxSignature::from(format!("sig-{from}-{to}-{block_time}").as_str()),
        direction: Direction::Neutral,
    }
}

fn empty_catalog() -> IntegrationCatalogData {
    IntegrationCatalogData { version: "t".to_string(), last_updated: chrono::Utc::now(), services: vec![], sources: vec![] }
}

fn far_deadline() -> Instant {
    Instant::now() + Duration::from_secs(30)
}

#[test]
fn empty_graph_produces_a_reported_low_risk_result() {
    let graph = GraphBuilder::new().build();
    let config = PipelineConfig::default();
    let (report, lifecycle) = run_from_graph(
        &graph,
        &Address::from("nobody"),
        &[],
        &empty_catalog(),
        &config,
        &DataQualityInputs::default(),
        None,
        far_deadline(),
    );
    assert_eq!(*lifecycle.current(), InvestigationState::Reported);
    assert_eq!(report.risk.level, chainwitness::shared::models::RiskLevel::Low);
    assert!(report.risk.final_score < 0.05);
}

#[test]
fn single_seed_linear_chain_propagates_decaying_taint_to_the_target() {
    let mut b = GraphBuilder::new();
    b.push_edge(edge("mixer", "hop1", 100.0, 1));
    b.push_edge(edge("hop1", "hop2", 90.0, 2));
    b.push_edge(edge("hop2", "target", 80.0, 3));
    let graph = b.build();

    let seeds = vec![TaintSeed { address: Address::from("mixer"), incident_id: IncidentId::from("incident-1"), initial_taint: 1.0, source: "known mixer".to_string() }];
    let config = PipelineConfig::default();

    let (report, lifecycle) = run_from_graph(
        &graph,
        &Address::from("target"),
        &seeds,
        &empty_catalog(),
        &config,
        &DataQualityInputs::default(),
        None,
        far_deadline(),
    );

    assert_eq!(*lifecycle.current(), InvestigationState::Reported);
    let target_result = report.taint_analysis.iter().find(|r| r.address == Address::from("target"));
    assert!(target_result.is_some(), "target should receive decayed taint");
    let target_result = target_result.unwrap();
    assert!(target_result.share > 0.0);
    assert!(target_result.share <= config.taint.decay_factor.powi(3));
}

#[test]
fn proportional_split_across_two_branches_each_carries_a_fraction_of_the_inflow() {
    let mut b = GraphBuilder::new();
    b.push_edge(edge("source", "left", 30.0, 1));
    b.push_edge(edge("source", "right", 70.0, 1));
    b.push_edge(edge("left", "sink", 30.0, 2));
    b.push_edge(edge("right", "sink", 70.0, 2));
    let graph = b.build();

    let seeds = vec![TaintSeed { address: Address::from("source"), incident_id: IncidentId::from("incident-2"), initial_taint: 1.0, source: "known theft".to_string() }];
    let config = PipelineConfig::default();

    let (report, _lifecycle) = run_from_graph(
        &graph,
        &Address::from("sink"),
        &seeds,
        &empty_catalog(),
        &config,
        &DataQualityInputs::default(),
        None,
        far_deadline(),
    );

    let left = report.taint_analysis.iter().find(|r| r.address == Address::from("left")).unwrap();
    let right = report.taint_analysis.iter().find(|r| r.address == Address::from("right")).unwrap();
    assert!(right.total_flow > left.total_flow, "the higher-value branch should carry more attributed flow");
}

#[test]
fn cash_out_to_a_known_exchange_produces_an_integration_event() {
    let mut b = GraphBuilder::new();
    b.push_edge(edge("mixer", "victim-wallet", 500.0, 1));
    b.push_edge(edge("victim-wallet", "binance-hot-wallet", 480.0, 2));
    let graph = b.build();

    let catalog = IntegrationCatalogData {
        version: "t".to_string(),
        last_updated: chrono::Utc::now(),
        services: vec![ServiceEndpoint {
            address: Address::from("binance-hot-wallet"),
            r#type: ServiceType::Cex,
            name: "Binance".to_string(),
            confidence: 1.0,
            last_verified: chrono::Utc::now(),
            metadata: Default::default(),
        }],
        sources: vec!["manual".to_string()],
    };
    let seeds = vec![TaintSeed { address: Address::from("mixer"), incident_id: IncidentId::from("incident-3"), initial_taint: 1.0, source: "known theft".to_string() }];
    let config = PipelineConfig::default();

    let (report, _lifecycle) = run_from_graph(
        &graph,
        &Address::from("victim-wallet"),
        &seeds,
        &catalog,
        &config,
        &DataQualityInputs::default(),
        None,
        far_deadline(),
    );

    assert!(!report.integration_events.is_empty(), "the cash-out to a cataloged exchange should be detected");
}

#[test]
fn evidence_paths_favor_the_higher_value_route() {
    let mut b = GraphBuilder::new();
    b.push_edge(edge("A", "via-small", 1.0, 1));
    b.push_edge(edge("via-small", "Z", 1.0, 2));
    b.push_edge(edge("A", "via-large", 500.0, 1));
    b.push_edge(edge("via-large", "Z", 500.0, 2));
    let graph = b.build();

    let config = PipelineConfig::default();
    let (report, _lifecycle) = run_from_graph(
        &graph,
        &Address::from("Z"),
        &[],
        &empty_catalog(),
        &config,
        &DataQualityInputs::default(),
        None,
        far_deadline(),
    );

    assert!(!report.evidence_paths.is_empty());
    let best = &report.evidence_paths[0];
    assert!(best.segments.iter().any(|s| s.from == Address::from("via-large") || s.to == Address::from("via-large")));
    for path in &report.evidence_paths {
        path.validate().expect("every returned evidence path must be a simple source-to-destination path");
    }
}

#[test]
fn a_legitimate_wallet_with_no_taint_seeds_stays_low_risk() {
    let mut b = GraphBuilder::new();
    for i in 0..6 {
        b.push_edge(edge("legit", &format!("counterparty-{i}"), 8.0, i));
        b.push_edge(edge(&format!("counterparty-{i}"), "legit", 7.5, i + 1));
    }
    let graph = b.build();
    let config = PipelineConfig::default();

    let (report, lifecycle) = run_from_graph(
        &graph,
        &Address::from("legit"),
        &[],
        &empty_catalog(),
        &config,
        &DataQualityInputs::default(),
        None,
        far_deadline(),
    );

    assert_eq!(*lifecycle.current(), InvestigationState::Reported);
    assert_eq!(report.risk.level, chainwitness::shared::models::RiskLevel::Low, "no taint seeds and routine activity should not be flagged");
}
