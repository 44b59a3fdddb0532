//! §4.5 `IntegrationCatalog`: disk-backed, atomically-swapped service
//! directory.

use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use parking_lot::RwLock;

use crate::config::CatalogConfig;
use crate::shared::models::{Address, IntegrationCatalogData, ServiceEndpoint, ServiceType};

fn embedded_default() -> IntegrationCatalogData {
    IntegrationCatalogData {
        version: "embedded-0".to_string(),
        last_updated: Utc::now(),
        services: Vec::new(),
        sources: vec!["embedded-default".to_string()],
    }
}

/// Process-wide catalog. Reads take a cheap `Arc` clone; updates replace
/// the whole value behind a write lock (§5).
pub struct IntegrationCatalog {
    data: RwLock<std::sync::Arc<IntegrationCatalogData>>,
    path: Option<PathBuf>,
    update_interval: Duration,
}

impl IntegrationCatalog {
    /// Loads from `path` if it exists and is newer than `config`'s update
    /// interval; otherwise seeds from the embedded default and persists it.
    pub fn load(path: Option<&Path>, config: &CatalogConfig) -> Self {
        let update_interval = Duration::hours(config.update_interval_hours as i64);
        let data = match path {
            Some(p) if p.exists() => match Self::read_from_disk(p) {
                Some(loaded) if Utc::now().signed_duration_since(loaded.last_updated) < update_interval => loaded,
                Some(stale) => stale,
                None => embedded_default(),
            },
            _ => embedded_default(),
        };

        let catalog = Self {
            data: RwLock::new(std::sync::Arc::new(data)),
            path: path.map(Path::to_path_buf),
            update_interval,
        };
        if path.is_none() || !path.unwrap().exists() {
            catalog.persist();
        }
        catalog
    }

    fn read_from_disk(path: &Path) -> Option<IntegrationCatalogData> {
        let text = std::fs::read_to_string(path)
            .map_err(|err| tracing::warn!(%err, path = %path.display(), "failed to read catalog file"))
            .ok()?;
        serde_json::from_str(&text)
            .map_err(|err| tracing::warn!(%err, "failed to parse catalog file"))
            .ok()
    }

    pub fn persist(&self) {
        let Some(path) = &self.path else { return };
        let snapshot = self.snapshot();
        match serde_json::to_vec_pretty(snapshot.as_ref()) {
            Ok(bytes) => {
                if let Err(err) = std::fs::write(path, bytes) {
                    tracing::warn!(%err, path = %path.display(), "failed to persist catalog file");
                }
            }
            Err(err) => tracing::warn!(%err, "failed to serialize catalog"),
        }
    }

    pub fn snapshot(&self) -> std::sync::Arc<IntegrationCatalogData> {
        self.data.read().clone()
    }

    /// Atomically swaps in a new catalog value and persists it.
    pub fn replace(&self, new_data: IntegrationCatalogData) {
        *self.data.write() = std::sync::Arc::new(new_data);
        self.persist();
    }

    pub fn is_stale(&self) -> bool {
        Utc::now().signed_duration_since(self.snapshot().last_updated) >= self.update_interval
    }

    pub fn lookup(&self, address: &Address) -> Option<ServiceEndpoint> {
        self.snapshot().services.iter().find(|s| &s.address == address).cloned()
    }

    pub fn filter_by_type(&self, service_type: ServiceType) -> Vec<ServiceEndpoint> {
        self.snapshot()
            .services
            .iter()
            .filter(|s| s.r#type == service_type)
            .cloned()
            .collect()
    }

    /// Checks whether any of `addresses` is in the catalog, returning the
    /// matching endpoints.
    pub fn check_involvement(&self, addresses: &[Address]) -> Vec<ServiceEndpoint> {
        let snapshot = self.snapshot();
        addresses
            .iter()
            .filter_map(|addr| snapshot.services.iter().find(|s| &s.address == addr))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_catalog_seeds_from_embedded_default() {
        let catalog = IntegrationCatalog::load(None, &CatalogConfig::default());
        assert_eq!(catalog.snapshot().sources, vec!["embedded-default".to_string()]);
    }

    #[test]
    fn replace_is_visible_to_later_reads() {
        let catalog = IntegrationCatalog::load(None, &CatalogConfig::default());
        let mut data = embedded_default();
        data.version = "v2".to_string();
        catalog.replace(data);
        assert_eq!(catalog.snapshot().version, "v2");
    }

    #[test]
    fn lookup_finds_matching_address() {
        let catalog = IntegrationCatalog::load(None, &CatalogConfig::default());
        let mut data = embedded_default();
        data.services.push(ServiceEndpoint {
            address: Address::from("cex1"),
            r#type: ServiceType::Cex,
            name: "Example CEX".to_string(),
            confidence: 0.9,
            last_verified: Utc::now(),
            metadata: Default::default(),
        });
        catalog.replace(data);
        assert!(catalog.lookup(&Address::from("cex1")).is_some());
        assert!(catalog.lookup(&Address::from("other")).is_none());
    }
}
