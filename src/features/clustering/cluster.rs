//! §4.4 cluster assembly: pairwise connection matrix, connected
//! components, and the size/confidence acceptance gate.

use std::collections::{HashMap, HashSet, VecDeque};

use chrono::Utc;
use uuid::Uuid;

use crate::config::ClusteringConfig;
use crate::shared::models::{Address, EntityCluster, EntitySignal};

fn pair_key(a: &Address, b: &Address) -> (Address, Address) {
    if a.as_str() <= b.as_str() {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

/// Builds `C[i,j] = max over signals involving both i and j of
/// signal.strength`, dropping signals weaker than `min_signal_strength`.
fn connection_matrix(signals: &[EntitySignal], config: &ClusteringConfig) -> HashMap<(Address, Address), f64> {
    let mut matrix: HashMap<(Address, Address), f64> = HashMap::new();
    for signal in signals {
        if signal.strength < config.min_signal_strength {
            continue;
        }
        for i in 0..signal.addresses.len() {
            for j in (i + 1)..signal.addresses.len() {
                let key = pair_key(&signal.addresses[i], &signal.addresses[j]);
                let entry = matrix.entry(key).or_insert(0.0);
                if signal.strength > *entry {
                    *entry = signal.strength;
                }
            }
        }
    }
    matrix
}

/// Assembles [`EntityCluster`]s from connected components of the
/// connection-matrix graph, thresholded at `min_signal_strength`.
/// Iterates candidate addresses in sorted order for deterministic BFS
/// seeding.
pub fn build_clusters(signals: &[EntitySignal], config: &ClusteringConfig) -> Vec<EntityCluster> {
    let matrix = connection_matrix(signals, config);

    let mut adjacency: HashMap<Address, Vec<(Address, f64)>> = HashMap::new();
    for ((a, b), weight) in &matrix {
        if *weight < config.min_signal_strength {
            continue;
        }
        adjacency.entry(a.clone()).or_default().push((b.clone(), *weight));
        adjacency.entry(b.clone()).or_default().push((a.clone(), *weight));
    }

    let mut nodes: Vec<Address> = adjacency.keys().cloned().collect();
    nodes.sort_by(|a, b| a.as_str().cmp(b.as_str()));

    let mut visited: HashSet<Address> = HashSet::new();
    let mut clusters = Vec::new();
    let now = Utc::now();

    for seed in &nodes {
        if visited.contains(seed) {
            continue;
        }
        let mut component: Vec<Address> = Vec::new();
        let mut weights: Vec<f64> = Vec::new();
        let mut queue = VecDeque::from([seed.clone()]);
        visited.insert(seed.clone());

        while let Some(addr) = queue.pop_front() {
            component.push(addr.clone());
            let mut neighbors = adjacency.get(&addr).cloned().unwrap_or_default();
            neighbors.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));
            for (neighbor, weight) in neighbors {
                weights.push(weight);
                if visited.insert(neighbor.clone()) {
                    queue.push_back(neighbor);
                }
            }
        }

        if !(2..=config.max_cluster_size).contains(&component.len()) {
            continue;
        }
        let avg_signal_strength = if weights.is_empty() {
            0.0
        } else {
            weights.iter().sum::<f64>() / weights.len() as f64
        };
        let confidence = (avg_signal_strength * component.len() as f64 / 10.0).min(1.0);
        if confidence < config.min_cluster_confidence {
            continue;
        }

        component.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        let member_set: HashSet<&Address> = component.iter().collect();
        let involved_signals: Vec<EntitySignal> = signals
            .iter()
            .filter(|s| s.addresses.iter().any(|a| member_set.contains(a)))
            .cloned()
            .collect();

        clusters.push(EntityCluster {
            id: Uuid::new_v4().to_string(),
            addresses: component,
            signals: involved_signals,
            confidence,
            created_at: now,
            last_updated: now,
        });
    }

    clusters
}

/// §8 universal invariant: clusters from one clustering output must have
/// pairwise-disjoint address sets.
pub fn validate_disjoint(clusters: &[EntityCluster]) -> Result<(), String> {
    let mut seen: HashSet<&Address> = HashSet::new();
    for cluster in clusters {
        for addr in &cluster.addresses {
            if !seen.insert(addr) {
                return Err(format!("address {addr} appears in more than one cluster"));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::SignalKind;
    use std::collections::HashMap as StdHashMap;

    fn signal(addresses: &[&str], strength: f64) -> EntitySignal {
        EntitySignal {
            kind: SignalKind::FeePayer,
            addresses: addresses.iter().map(|a| Address::from(*a)).collect(),
            strength,
            evidence_txs: Vec::new(),
            metadata: StdHashMap::new(),
        }
    }

    #[test]
    fn connected_component_becomes_one_cluster() {
        let config = ClusteringConfig {
            min_signal_strength: 0.1,
            min_cluster_confidence: 0.0,
            ..ClusteringConfig::default()
        };
        let signals = vec![signal(&["A", "B", "C"], 0.9)];
        let clusters = build_clusters(&signals, &config);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].addresses.len(), 3);
        validate_disjoint(&clusters).unwrap();
    }

    #[test]
    fn weak_signals_below_threshold_are_ignored() {
        let config = ClusteringConfig {
            min_signal_strength: 0.5,
            ..ClusteringConfig::default()
        };
        let signals = vec![signal(&["A", "B"], 0.1)];
        assert!(build_clusters(&signals, &config).is_empty());
    }

    #[test]
    fn oversized_components_are_rejected() {
        let config = ClusteringConfig {
            min_signal_strength: 0.1,
            min_cluster_confidence: 0.0,
            max_cluster_size: 2,
            ..ClusteringConfig::default()
        };
        let signals = vec![signal(&["A", "B", "C"], 0.9)];
        assert!(build_clusters(&signals, &config).is_empty());
    }
}
