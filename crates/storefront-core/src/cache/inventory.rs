//! Inventory snapshot cache with single-flight fetching.
//!
//! At most one upstream fetch is outstanding at any time. The first caller to
//! find the snapshot missing or expired spawns a fetch task and parks a shared
//! handle to it in the cache state; every later caller awaits a clone of that
//! handle. The task itself installs the result, so the snapshot and index are
//! written exactly once per fetch, and a fetch whose waiters all go away still
//! runs to completion.

use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::InventoryConfig;
use crate::index::{build_index, normalize_query, resolve, scan, SearchIndex};
use crate::models::{IndexFreshness, IndexStatus, InventoryItem};
use crate::network::InventorySource;

/// A full inventory snapshot, shared between the cache, the index, and callers.
pub type InventorySnapshot = Arc<Vec<InventoryItem>>;

type SharedFetch = Shared<BoxFuture<'static, InventorySnapshot>>;

#[derive(Debug)]
struct CachedSnapshot {
    items: InventorySnapshot,
    fetched_at: Instant,
}

#[derive(Default)]
struct CacheState {
    snapshot: Option<CachedSnapshot>,
    index: Option<Arc<SearchIndex>>,
    building: bool,
    in_flight: Option<SharedFetch>,
    /// Bumped by `clear`; a fetch started under an older generation must not install.
    /// The fetch itself stays in `in_flight` until it finishes.
    generation: u64,
}

/// Inventory snapshot plus the search index built from it.
#[derive(Clone)]
pub struct InventoryCache {
    source: Arc<dyn InventorySource>,
    ttl: Duration,
    state: Arc<Mutex<CacheState>>,
}

impl InventoryCache {
    pub fn new(source: Arc<dyn InventorySource>) -> Self {
        Self::with_ttl(source, InventoryConfig::SNAPSHOT_TTL)
    }

    pub fn with_ttl(source: Arc<dyn InventorySource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            state: Arc::new(Mutex::new(CacheState::default())),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn source(&self) -> &Arc<dyn InventorySource> {
        &self.source
    }

    /// Current inventory, fetching it if missing or expired.
    ///
    /// Never fails. If a refetch comes back empty the previous snapshot (even
    /// an expired one) is returned and kept; with no previous snapshot the
    /// result is empty and nothing is cached.
    pub async fn get_inventory(&self) -> InventorySnapshot {
        let fetch = {
            let mut state = lock(&self.state);
            if let Some(snapshot) = &state.snapshot {
                if snapshot.fetched_at.elapsed() < self.ttl {
                    debug!("Inventory cache hit ({} items)", snapshot.items.len());
                    return snapshot.items.clone();
                }
            }
            match &state.in_flight {
                Some(fetch) => {
                    debug!("Joining in-flight inventory fetch");
                    fetch.clone()
                }
                None => self.start_fetch(&mut state),
            }
        };
        fetch.await
    }

    /// Search the current inventory.
    ///
    /// Uses the index when it is fresh and belongs to the returned snapshot;
    /// otherwise falls back to a linear scan of whatever snapshot is available.
    pub async fn search(&self, query: &str) -> Vec<InventoryItem> {
        if normalize_query(query).is_none() {
            return Vec::new();
        }

        let snapshot = self.get_inventory().await;
        match self.fresh_index() {
            Some(index) if Arc::ptr_eq(index.all_items(), &snapshot) => resolve(&index, query),
            _ => {
                debug!("No fresh index, scanning {} items", snapshot.len());
                scan(&snapshot, query)
            }
        }
    }

    /// Drop the snapshot and index.
    ///
    /// An in-flight fetch is left running and later callers still join it, so
    /// no second fetch starts while it is outstanding. Its result is handed to
    /// those callers but not installed.
    pub fn clear(&self) {
        let mut state = lock(&self.state);
        state.generation = state.generation.wrapping_add(1);
        state.snapshot = None;
        state.index = None;
        state.building = false;
    }

    pub fn is_cached(&self) -> bool {
        lock(&self.state).snapshot.is_some()
    }

    pub fn is_fetching(&self) -> bool {
        lock(&self.state).in_flight.is_some()
    }

    /// Time since the cached snapshot was fetched.
    pub fn snapshot_age(&self) -> Option<Duration> {
        lock(&self.state)
            .snapshot
            .as_ref()
            .map(|snapshot| snapshot.fetched_at.elapsed())
    }

    /// Time since the current index was built.
    pub fn index_age(&self) -> Option<Duration> {
        lock(&self.state)
            .index
            .as_ref()
            .map(|index| index.built_at().elapsed())
    }

    pub fn index(&self) -> Option<Arc<SearchIndex>> {
        lock(&self.state).index.clone()
    }

    pub fn freshness(&self) -> IndexFreshness {
        let state = lock(&self.state);
        self.freshness_of(&state)
    }

    pub fn index_status(&self) -> IndexStatus {
        let state = lock(&self.state);
        let index = state.index.as_deref();
        IndexStatus {
            state: self.freshness_of(&state),
            item_count: index.map_or(0, SearchIndex::len),
            exact_model_keys: index.map_or(0, SearchIndex::exact_model_count),
            model_tokens: index.map_or(0, SearchIndex::model_token_count),
            brands: index.map_or(0, SearchIndex::brand_count),
            description_words: index.map_or(0, SearchIndex::description_word_count),
            categories: index.map_or(0, SearchIndex::category_count),
            fetch_in_flight: state.in_flight.is_some(),
        }
    }

    fn freshness_of(&self, state: &CacheState) -> IndexFreshness {
        if state.building {
            return IndexFreshness::Building;
        }
        match &state.index {
            None => IndexFreshness::Empty,
            Some(index) if index.built_at().elapsed() < self.ttl => IndexFreshness::Fresh,
            Some(_) => IndexFreshness::Stale,
        }
    }

    fn fresh_index(&self) -> Option<Arc<SearchIndex>> {
        let state = lock(&self.state);
        state
            .index
            .as_ref()
            .filter(|index| index.built_at().elapsed() < self.ttl)
            .cloned()
    }

    fn start_fetch(&self, state: &mut CacheState) -> SharedFetch {
        let generation = state.generation;
        let source = self.source.clone();
        let handle = self.state.clone();

        info!("Starting inventory fetch");
        let task = tokio::spawn({
            let handle = handle.clone();
            async move {
                let items = source.fetch_inventory().await;
                install(&handle, generation, items)
            }
        });

        let fetch = async move {
            match task.await {
                Ok(items) => items,
                Err(e) => {
                    warn!("Inventory fetch task failed: {}", e);
                    let mut state = lock(&handle);
                    state.in_flight = None;
                    state.building = false;
                    let previous = state.snapshot.as_ref().map(|s| s.items.clone());
                    previous.unwrap_or_default()
                }
            }
        }
        .boxed()
        .shared();

        state.in_flight = Some(fetch.clone());
        fetch
    }
}

/// Store a completed fetch and rebuild the index.
///
/// Always retires `in_flight`: only one fetch is outstanding, so it is this one.
fn install(
    handle: &Mutex<CacheState>,
    generation: u64,
    items: Vec<InventoryItem>,
) -> InventorySnapshot {
    let fetched_at = Instant::now();
    {
        let mut state = lock(handle);
        if state.generation != generation {
            state.in_flight = None;
            debug!("Cache cleared during fetch, discarding {} items", items.len());
            return Arc::new(items);
        }

        if items.is_empty() {
            state.in_flight = None;
            return match &state.snapshot {
                Some(previous) => {
                    warn!(
                        "Inventory fetch returned nothing, keeping previous snapshot of {} items",
                        previous.items.len()
                    );
                    previous.items.clone()
                }
                None => {
                    warn!("Inventory fetch returned nothing and no snapshot is cached");
                    Arc::new(Vec::new())
                }
            };
        }
        state.building = true;
    }

    let items = Arc::new(items);
    let index = build_index(items.clone());

    let mut state = lock(handle);
    state.in_flight = None;
    if state.generation != generation {
        debug!("Cache cleared while indexing, discarding {} items", items.len());
        return items;
    }
    state.building = false;
    state.snapshot = Some(CachedSnapshot {
        items: items.clone(),
        fetched_at,
    });
    state.index = Some(Arc::new(index));
    info!("Inventory cached and indexed ({} items)", items.len());
    items
}

fn lock(state: &Mutex<CacheState>) -> MutexGuard<'_, CacheState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
