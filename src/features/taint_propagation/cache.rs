//! F2/§4.3 process-wide `TaintCache`: composite-key lookup, TTL + LRU
//! eviction, optional one-file-per-key disk persistence.

use std::path::PathBuf;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::config::TaintCacheConfig;
use crate::shared::models::{Address, IncidentId, TaintResult, TxGraph};
use crate::shared::util::{graph_hash, incident_set_hash};

use super::propagate::TaintMetrics;

/// Composite cache key (§4.3): slot range plus hashes of the incident
/// set and graph shape that produced the cached results.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub slot_range_start: Option<u64>,
    pub slot_range_end: Option<u64>,
    pub incident_set_hash: String,
    pub graph_hash: String,
}

impl CacheKey {
    pub fn build(
        slot_range: (Option<u64>, Option<u64>),
        seeds: &[(IncidentId, Address, f64)],
        graph: &TxGraph,
        config: &TaintCacheConfig,
    ) -> Self {
        Self {
            slot_range_start: slot_range.0,
            slot_range_end: slot_range.1,
            incident_set_hash: incident_set_hash(seeds),
            graph_hash: graph_hash(graph, config.graph_hash_sample_n),
        }
    }

    fn file_name(&self) -> String {
        let raw = format!(
            "{}-{}-{}-{}",
            self.slot_range_start.unwrap_or(0),
            self.slot_range_end.unwrap_or(0),
            self.incident_set_hash,
            self.graph_hash
        );
        format!("{}.json", blake3::hash(raw.as_bytes()).to_hex())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    results: Vec<TaintResult>,
    metrics: TaintMetrics,
    created_at: i64,
    last_accessed: i64,
    computation_time_ms: u64,
}

fn now_unix() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs() as i64).unwrap_or(0)
}

/// Concurrent, TTL + LRU-bounded cache of propagation results.
pub struct TaintCache {
    config: TaintCacheConfig,
    entries: DashMap<CacheKey, CacheEntry>,
    disk_dir: Option<PathBuf>,
    /// Logical clock for LRU ordering; avoids wall-clock second-resolution
    /// ties between entries created in the same second.
    clock: AtomicI64,
}

impl TaintCache {
    pub fn new(config: TaintCacheConfig, disk_dir: Option<PathBuf>) -> Self {
        Self {
            config,
            entries: DashMap::new(),
            disk_dir,
            clock: AtomicI64::new(0),
        }
    }

    fn tick(&self) -> i64 {
        self.clock.fetch_add(1, Ordering::SeqCst)
    }

    /// Reads a cached result set, updating `last_accessed` on hit.
    pub fn get(&self, key: &CacheKey) -> Option<(Vec<TaintResult>, TaintMetrics)> {
        let tick = self.tick();
        if let Some(mut entry) = self.entries.get_mut(key) {
            if self.is_expired(&entry) {
                drop(entry);
                self.entries.remove(key);
                return None;
            }
            entry.last_accessed = tick;
            return Some((entry.results.clone(), entry.metrics));
        }
        None
    }

    pub fn put(&self, key: CacheKey, results: Vec<TaintResult>, metrics: TaintMetrics, computation_time_ms: u64) {
        let last_accessed = self.tick();
        let entry = CacheEntry {
            results,
            metrics,
            created_at: now_unix(),
            last_accessed,
            computation_time_ms,
        };
        if self.config.persist_to_disk {
            self.persist(&key, &entry);
        }
        self.entries.insert(key, entry);
        self.cleanup();
    }

    fn is_expired(&self, entry: &CacheEntry) -> bool {
        let ttl_seconds = self.config.ttl_hours as i64 * 3600;
        now_unix() - entry.created_at > ttl_seconds
    }

    /// Deletes any entry whose surviving [`TaintResult`] set references an
    /// incident in `ids`.
    pub fn invalidate_by_incidents(&self, ids: &[IncidentId]) {
        self.entries
            .retain(|_, entry| !entry.results.iter().any(|r| ids.contains(&r.incident_id)));
    }

    /// Evicts TTL-expired entries first, then LRU down to `max_size`.
    pub fn cleanup(&self) {
        let expired: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|e| self.is_expired(e.value()))
            .map(|e| e.key().clone())
            .collect();
        for key in expired {
            self.entries.remove(&key);
        }

        if self.entries.len() <= self.config.max_size {
            return;
        }
        let mut by_access: Vec<(CacheKey, i64)> =
            self.entries.iter().map(|e| (e.key().clone(), e.value().last_accessed)).collect();
        by_access.sort_by_key(|(_, last_accessed)| *last_accessed);
        let overflow = self.entries.len() - self.config.max_size;
        for (key, _) in by_access.into_iter().take(overflow) {
            self.entries.remove(&key);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self, key: &CacheKey, entry: &CacheEntry) {
        let Some(dir) = &self.disk_dir else { return };
        if let Err(err) = std::fs::create_dir_all(dir) {
            tracing::warn!(%err, "failed to create taint cache directory");
            return;
        }
        let path = dir.join(key.file_name());
        match serde_json::to_vec_pretty(entry) {
            Ok(bytes) => {
                if let Err(err) = std::fs::write(&path, bytes) {
                    tracing::warn!(%err, path = %path.display(), "failed to persist taint cache entry");
                }
            }
            Err(err) => tracing::warn!(%err, "failed to serialize taint cache entry"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::GraphBuilder;

    fn sample_key() -> CacheKey {
        let graph = GraphBuilder::new().build();
        CacheKey::build((None, None), &[], &graph, &TaintCacheConfig::default())
    }

    fn sample_result(incident: &str) -> TaintResult {
        TaintResult {
            address: Address::from("A"),
            share: 0.5,
            hop: 0,
            incident_id: IncidentId::from(incident),
            path: vec![Address::from("A")],
            total_flow: 0.0,
        }
    }

    #[test]
    fn put_then_get_round_trips() {
        let cache = TaintCache::new(TaintCacheConfig::default(), None);
        let key = sample_key();
        cache.put(key.clone(), vec![sample_result("i1")], TaintMetrics::default(), 5);
        let (results, _) = cache.get(&key).expect("should hit");
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn invalidate_by_incidents_removes_matching_entries() {
        let cache = TaintCache::new(TaintCacheConfig::default(), None);
        let key = sample_key();
        cache.put(key.clone(), vec![sample_result("i1")], TaintMetrics::default(), 5);
        cache.invalidate_by_incidents(&[IncidentId::from("i1")]);
        assert!(cache.get(&key).is_none());
    }

    #[test]
    fn cleanup_evicts_lru_past_max_size() {
        let mut config = TaintCacheConfig::default();
        config.max_size = 1;
        let cache = TaintCache::new(config, None);

        let graph = GraphBuilder::new().build();
        let key_a = CacheKey::build(
            (None, None),
            &[(IncidentId::from("i1"), Address::from("A"), 1.0)],
            &graph,
            &cache.config,
        );
        let key_b = CacheKey::build(
            (None, None),
            &[(IncidentId::from("i2"), Address::from("B"), 1.0)],
            &graph,
            &cache.config,
        );
        cache.put(key_a.clone(), vec![sample_result("i1")], TaintMetrics::default(), 1);
        cache.put(key_b.clone(), vec![sample_result("i2")], TaintMetrics::default(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&key_a).is_none());
        assert!(cache.get(&key_b).is_some());
    }
}
