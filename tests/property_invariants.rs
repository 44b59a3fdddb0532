//! §8 universal invariants, exercised over randomly generated graphs,
//! seeds, signals and configs rather than fixed cases.

use std::collections::HashSet;

use proptest::prelude::*;

use chainwitness::config::{ClusteringConfig, Preset, TaintConfig, Validatable};
use chainwitness::config::profile::COMPONENT_NAMES;
use chainwitness::features::clustering::{build_clusters, extract_signals, validate_disjoint};
use chainwitness::features::explainability::select_evidence_paths;
use chainwitness::features::risk_engine::aggregate;
use chainwitness::features::taint_propagation::propagate;
use chainwitness::shared::models::{
    Address, Direction, GraphBuilder, ProgramId, RiskComponent, TaintSeed, TxEdge, TxSignature,
};

const ADDRESS_POOL: usize = 8;

fn address(n: u8) -> Address {
    Address::from(format!("addr-{n}").as_str())
}

fn arb_edge() -> impl Strategy<Value = TxEdge> {
    (0..ADDRESS_POOL as u8, 0..ADDRESS_POOL as u8, 0.1f64..200.0, 0i64..50)
        .prop_filter("edges must not be self-loops", |(from, to, _, _)| from != to)
        .prop_map(|(from, to, value, block_time)| TxEdge {
            from: address(from),
            to: address(to),
            value,
            slot: None,
            block_time: Some(block_time),
            program: ProgramId::from(if block_time % 2 == 0 { "system" } else { "token" }),
            tx_signature: TxSignature::from(format!("sig-{from}-{to}-{block_time}-{value}").as_str()),
            direction: Direction::Neutral,
        })
}

fn arb_edges() -> impl Strategy<Value = Vec<TxEdge>> {
    prop::collection::vec(arb_edge(), 0..20)
}

proptest! {
    /// fanIn(addr).count + fanOut(addr).count == the number of edges
    /// incident to `addr`, for every address in the graph.
    #[test]
    fn fan_counts_sum_to_incident_edges(edges in arb_edges()) {
        let mut builder = GraphBuilder::new();
        builder.extend(edges);
        let graph = builder.build();

        for addr in graph.nodes() {
            let fan_in = chainwitness::features::graph_builder::fan_in(&graph, addr);
            let fan_out = chainwitness::features::graph_builder::fan_out(&graph, addr);
            let incident = graph.edges().iter().filter(|e| (&e.from == addr || &e.to == addr) && e.is_value_bearing()).count();
            prop_assert_eq!(fan_in.count + fan_out.count, incident);
        }
    }

    /// Every taint result's share never exceeds `initialTaint *
    /// decayFactor^hop` for its originating seed.
    #[test]
    fn taint_share_never_exceeds_the_decay_bound(edges in arb_edges(), seed_addr in 0..ADDRESS_POOL as u8, initial_taint in 0.0f64..=1.0) {
        let mut builder = GraphBuilder::new();
        builder.extend(edges);
        let graph = builder.build();

        let seeds = vec![TaintSeed {
            address: address(seed_addr),
            incident_id: chainwitness::shared::models::IncidentId::from("incident"),
            initial_taint,
            source: "fuzz".to_string(),
        }];
        let config = TaintConfig::default();
        let (results, _metrics) = propagate(&graph, &seeds, &config);
        for result in &results {
            prop_assert!(result.validate(config.decay_factor, initial_taint).is_ok());
        }
    }

    /// `validate_disjoint` always holds over clusters assembled from
    /// randomly generated edges, since clustering only ever groups by
    /// connected components of the signal graph.
    #[test]
    fn clusters_built_from_random_graphs_stay_disjoint(edges in arb_edges()) {
        let config = ClusteringConfig::default();
        let signals = extract_signals(&edges, &config);
        let clusters = build_clusters(&signals, &config);
        prop_assert!(validate_disjoint(&clusters).is_ok());
    }

    /// Every evidence path returned for a random graph is a simple,
    /// contiguous source-to-destination path (§8).
    #[test]
    fn evidence_paths_are_always_simple_paths(edges in arb_edges(), target_addr in 0..ADDRESS_POOL as u8) {
        let mut builder = GraphBuilder::new();
        builder.extend(edges);
        let graph = builder.build();
        let target = address(target_addr);
        let config = chainwitness::config::ExplainabilityConfig::default();

        let paths = select_evidence_paths(&graph, &target, &[], &config);
        for path in &paths {
            prop_assert!(path.validate().is_ok());
        }
    }

    /// A [`RiskConfig`] validates if and only if its weights sum to 1.0
    /// within tolerance, its thresholds are strictly increasing, and
    /// every bounded field sits in `[0, 1]`.
    #[test]
    fn risk_config_validator_matches_its_stated_bounds(
        drift in -0.05f64..0.05,
        medium in 0.0f64..1.0,
        high in 0.0f64..1.0,
        critical in 0.0f64..1.0,
    ) {
        let mut config = Preset::Balanced.risk_config();
        *config.weights.get_mut("taintProximity").unwrap() += drift;
        config.threshold_medium = medium;
        config.threshold_high = high;
        config.threshold_critical = critical;

        let sum: f64 = config.weights.values().sum();
        let weights_ok = (sum - 1.0).abs() <= 0.001;
        let thresholds_ok = medium < high && high < critical;
        let expected_ok = weights_ok && thresholds_ok;

        prop_assert_eq!(config.validate().is_ok(), expected_ok);
    }

    /// Increasing any additive component's score never lowers the final
    /// risk level; increasing dataQualityPenalty (subtractive) never
    /// raises it.
    #[test]
    fn risk_level_is_monotone_in_each_component(
        base_scores in prop::collection::vec(0.0f64..1.0, 6),
        bump_index in 0usize..6,
    ) {
        let config = Preset::Balanced.risk_config();
        let names = COMPONENT_NAMES;

        let build = |scores: &[f64]| -> Vec<RiskComponent> {
            names
                .iter()
                .zip(scores.iter())
                .map(|(name, score)| RiskComponent {
                    name: *name,
                    score: *score,
                    weight: config.weights[*name],
                    confidence: 1.0,
                    evidence: vec![],
                    threshold_breached: false,
                    raw_value: *score,
                    metadata: Default::default(),
                })
                .collect()
        };

        let before = aggregate(build(&base_scores), &config);

        let mut bumped_scores = base_scores.clone();
        bumped_scores[bump_index] = (bumped_scores[bump_index] + 0.2).min(1.0);
        let after = aggregate(build(&bumped_scores), &config);

        if names[bump_index] == "dataQualityPenalty" {
            prop_assert!(after.level <= before.level);
        } else {
            prop_assert!(after.level >= before.level);
        }
    }
}

#[test]
fn duplicate_addresses_never_appear_across_two_clusters_worked_example() {
    let mut builder = GraphBuilder::new();
    for i in 0..4u8 {
        builder.push_edge(TxEdge {
            from: address(0),
            to: address(i + 1),
            value: 10.0,
            slot: None,
            block_time: Some(i as i64),
            program: ProgramId::from("system"),
            tx_signature: TxSignature::from(format!("sig-{i}").as_str()),
            direction: Direction::Neutral,
        });
    }
    let graph = builder.build();
    let config = ClusteringConfig::default();
    let edges: Vec<TxEdge> = graph.edges().to_vec();
    let signals = extract_signals(&edges, &config);
    let clusters = build_clusters(&signals, &config);
    validate_disjoint(&clusters).unwrap();

    let mut seen = HashSet::new();
    for cluster in &clusters {
        for addr in &cluster.addresses {
            assert!(seen.insert(addr.clone()));
        }
    }
}
