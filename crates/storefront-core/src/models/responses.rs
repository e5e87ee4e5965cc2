use serde::{Deserialize, Serialize};

/// Snapshot of the inventory search caches, as reported to the UI.
///
/// Ages are milliseconds since the snapshot was fetched / the index was built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    pub inventory_cached: bool,
    pub inventory_cache_age: Option<u64>,
    pub search_cache_size: usize,
    pub index_available: bool,
    pub index_age: Option<u64>,
}

/// Lifecycle of the search index.
///
/// `Fresh` becomes `Stale` purely by elapsed time; nothing ticks in the
/// background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexFreshness {
    Empty,
    Building,
    Fresh,
    Stale,
}

impl IndexFreshness {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexFreshness::Empty => "empty",
            IndexFreshness::Building => "building",
            IndexFreshness::Fresh => "fresh",
            IndexFreshness::Stale => "stale",
        }
    }
}

impl std::fmt::Display for IndexFreshness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Index detail for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStatus {
    pub state: IndexFreshness,
    pub item_count: usize,
    pub exact_model_keys: usize,
    pub model_tokens: usize,
    pub brands: usize,
    pub description_words: usize,
    pub categories: usize,
    pub fetch_in_flight: bool,
}

/// Size of the durable parts cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartsStatus {
    pub cached_models: usize,
    pub cached_parts: usize,
    pub model_id_mappings: usize,
}
