use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

use crate::config::SearchConfig;
use crate::models::InventoryItem;

#[derive(Debug, Clone)]
struct CachedResults {
    results: Vec<InventoryItem>,
    cached_at: Instant,
}

/// Recent query results keyed by lower-cased query text.
///
/// Bounded by insertion order: once full, inserting a new key evicts the
/// oldest-inserted one regardless of how recently it was read. Entries older
/// than the TTL are dropped when read.
#[derive(Debug)]
pub struct QueryCache {
    entries: HashMap<String, CachedResults>,
    order: VecDeque<String>,
    capacity: usize,
    ttl: Duration,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(
            SearchConfig::QUERY_CACHE_CAPACITY,
            SearchConfig::QUERY_CACHE_TTL,
        )
    }
}

impl QueryCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
            ttl,
        }
    }

    /// Cached results for `key`, if present and younger than the TTL.
    pub fn get(&mut self, key: &str) -> Option<Vec<InventoryItem>> {
        let expired = match self.entries.get(key) {
            None => return None,
            Some(entry) => entry.cached_at.elapsed() >= self.ttl,
        };

        if expired {
            trace!("Query cache entry expired: {}", key);
            self.remove(key);
            return None;
        }
        self.entries.get(key).map(|entry| entry.results.clone())
    }

    /// Store results under `key`.
    ///
    /// Re-inserting an existing key refreshes it in place without changing
    /// its eviction position.
    pub fn insert(&mut self, key: impl Into<String>, results: Vec<InventoryItem>) {
        let key = key.into();
        let entry = CachedResults {
            results,
            cached_at: Instant::now(),
        };

        if let Some(existing) = self.entries.get_mut(&key) {
            *existing = entry;
            return;
        }

        while self.entries.len() >= self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            trace!("Evicting query cache entry: {}", oldest);
            self.entries.remove(&oldest);
        }

        self.order.push_back(key.clone());
        self.entries.insert(key, entry);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
        self.order.retain(|k| k != key);
    }
}
