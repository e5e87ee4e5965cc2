//! Inventory search and cache methods on CatalogService.

use chrono::{DateTime, Utc};
use std::sync::{MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{InventorySnapshot, QueryCache};
use crate::index::normalize_query;
use crate::models::{CacheStatus, IndexFreshness, IndexStatus, InventoryItem};
use crate::CatalogService;

impl CatalogService {
    // ========================================
    // Search
    // ========================================

    /// Search the inventory. Alias for [`CatalogService::search_cached`].
    pub async fn search(&self, query: &str) -> Vec<InventoryItem> {
        self.search_cached(query).await
    }

    /// Search through the query cache.
    ///
    /// Queries shorter than two characters return nothing without touching
    /// the inventory. A fresh cached result is returned as is; otherwise the
    /// query is resolved and the result cached under the lower-cased query.
    pub async fn search_cached(&self, query: &str) -> Vec<InventoryItem> {
        let Some(key) = normalize_query(query) else {
            return Vec::new();
        };

        let cached = self.queries().get(&key);
        if let Some(results) = cached {
            debug!("Query cache hit: {}", key);
            return results;
        }

        let results = self.inner.inventory.search(&key).await;

        // Nothing to search yet means the fetch failed; don't pin that for the query TTL
        if self.inner.inventory.is_cached() {
            self.queries().insert(key, results.clone());
        }
        results
    }

    /// Current inventory snapshot, fetching it if missing or expired.
    pub async fn get_inventory(&self) -> InventorySnapshot {
        self.inner.inventory.get_inventory().await
    }

    /// Warm the inventory cache in the background.
    ///
    /// Joins an in-flight fetch if there is one. The returned handle may be
    /// dropped; the fetch runs to completion either way.
    pub fn preload(&self) -> JoinHandle<()> {
        let inventory = self.inner.inventory.clone();
        tokio::spawn(async move {
            let items = inventory.get_inventory().await;
            info!("Preloaded {} inventory items", items.len());
        })
    }

    /// Fetch records changed upstream since `since`. Not cached.
    pub async fn fetch_inventory_changes(&self, since: DateTime<Utc>) -> Vec<InventoryItem> {
        self.inner
            .inventory
            .source()
            .fetch_inventory_changes(since)
            .await
    }

    // ========================================
    // Cache Management
    // ========================================

    /// Drop the inventory snapshot, the index, and every cached query.
    pub fn clear_cache(&self) {
        self.inner.inventory.clear();
        self.queries().clear();
        info!("Inventory and query caches cleared");
    }

    pub fn get_cache_status(&self) -> CacheStatus {
        let inventory = &self.inner.inventory;
        let inventory_cache_age = inventory.snapshot_age().map(as_millis);
        let index_age = inventory.index_age().map(as_millis);

        CacheStatus {
            inventory_cached: inventory_cache_age.is_some(),
            inventory_cache_age,
            search_cache_size: self.queries().len(),
            index_available: index_age.is_some(),
            index_age,
        }
    }

    pub fn index_freshness(&self) -> IndexFreshness {
        self.inner.inventory.freshness()
    }

    pub fn index_status(&self) -> IndexStatus {
        self.inner.inventory.index_status()
    }

    fn queries(&self) -> MutexGuard<'_, QueryCache> {
        self.inner
            .queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn as_millis(age: Duration) -> u64 {
    u64::try_from(age.as_millis()).unwrap_or(u64::MAX)
}
