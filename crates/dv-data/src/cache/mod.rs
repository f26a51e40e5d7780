//! Domain caching layer
//!
//! Hosts that recompose on every interaction can share one cache across
//! calls. Entries are keyed by dataset identity, so a reload always misses.

use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::RwLock;

use crate::dataset::{Dataset, DatasetId, Domain};

/// Memo of scanned domains keyed by `(dataset, field)`
#[derive(Clone)]
pub struct DomainCache {
    entries: Arc<RwLock<AHashMap<(DatasetId, String), Domain>>>,
    /// Maximum number of entries to keep
    max_entries: usize,
}

impl DomainCache {
    /// Create a new domain cache
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(AHashMap::new())),
            max_entries: max_entries.max(1),
        }
    }

    /// Get a cached domain
    pub fn get(&self, dataset: DatasetId, field: &str) -> Option<Domain> {
        self.entries.read().get(&(dataset, field.to_string())).cloned()
    }

    /// Cached domain of `field`, scanning the dataset on a miss
    pub fn get_or_compute(&self, dataset: &Dataset, field: &str) -> Option<Domain> {
        if let Some(domain) = self.get(dataset.id(), field) {
            tracing::debug!("Domain cache hit for '{}'", field);
            return Some(domain);
        }

        tracing::debug!("Domain cache miss for '{}'", field);
        let domain = dataset.domain(field)?;
        self.put(dataset.id(), field, domain.clone());
        Some(domain)
    }

    fn put(&self, dataset: DatasetId, field: &str, domain: Domain) {
        let mut entries = self.entries.write();
        let key = (dataset, field.to_string());

        if entries.len() >= self.max_entries && !entries.contains_key(&key) {
            // Entries from superseded datasets are never hit again; drop them first
            let stale: Vec<_> = entries
                .keys()
                .filter(|(id, _)| *id != dataset)
                .cloned()
                .collect();
            if stale.is_empty() {
                if let Some(victim) = entries.keys().next().cloned() {
                    entries.remove(&victim);
                }
            } else {
                for stale_key in stale {
                    entries.remove(&stale_key);
                }
            }
        }

        entries.insert(key, domain);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for DomainCache {
    fn default() -> Self {
        Self::new(256)
    }
}
