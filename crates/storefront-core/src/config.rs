//! Centralized configuration for the storefront catalog.
//!
//! Constant holders for cache lifetimes and search limits, plus the runtime
//! settings needed to reach the two upstream backends.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Inventory snapshot and fetch configuration.
pub struct InventoryConfig;

impl InventoryConfig {
    /// How long a fetched inventory snapshot (and the index built from it) stays fresh.
    pub const SNAPSHOT_TTL: Duration = Duration::from_secs(60 * 60);
    /// The upstream is slow; one attempt gets this long.
    pub const FETCH_TIMEOUT: Duration = Duration::from_secs(180);
    pub const RESOURCE: &'static str = "inventory";
    pub const CHANGES_RESOURCE: &'static str = "inventorychanges";
}

/// Query resolution and query-cache configuration.
pub struct SearchConfig;

impl SearchConfig {
    pub const MIN_QUERY_CHARS: usize = 2;
    pub const RESULT_LIMIT: usize = 50;
    /// Below this many index hits the resolver also runs a linear substring scan.
    pub const FALLBACK_SCAN_THRESHOLD: usize = 50;
    pub const QUERY_CACHE_CAPACITY: usize = 100;
    pub const QUERY_CACHE_TTL: Duration = Duration::from_secs(20 * 60);
    /// Model tokens must be longer than this to be indexed.
    pub const MIN_MODEL_TOKEN_LEN: usize = 2;
    /// Description words must be longer than this to be indexed.
    pub const MIN_DESCRIPTION_WORD_LEN: usize = 3;
}

/// Repair-parts catalog configuration.
pub struct PartsConfig;

impl PartsConfig {
    pub const PARTS_STORAGE_KEY: &'static str = "parts_cache";
    pub const MODEL_ID_STORAGE_KEY: &'static str = "model_id_map";
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
    pub const DIAGRAMS_PATH: &'static str = "get-diagrams";
    pub const DIAGRAM_PARTS_PATH: &'static str = "get-diagram-parts";
}

/// Connection settings for the inventory backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GatewaySettings {
    /// Base URL of the inventory REST endpoint.
    pub base_url: String,
    pub dealer_id: String,
    pub rest_code: String,
    /// Single-attempt request timeout.
    #[serde(default = "default_fetch_timeout", with = "duration_secs")]
    pub timeout: Duration,
}

impl GatewaySettings {
    pub fn new(
        base_url: impl Into<String>,
        dealer_id: impl Into<String>,
        rest_code: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            dealer_id: dealer_id.into(),
            rest_code: rest_code.into(),
            timeout: InventoryConfig::FETCH_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Connection settings for the repair-parts backend.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PartsGatewaySettings {
    pub base_url: String,
    pub username: String,
    pub password: String,
    #[serde(default = "default_parts_timeout", with = "duration_secs")]
    pub timeout: Duration,
}

impl std::fmt::Debug for PartsGatewaySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartsGatewaySettings")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl PartsGatewaySettings {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
            timeout: PartsConfig::REQUEST_TIMEOUT,
        }
    }
}

fn default_fetch_timeout() -> Duration {
    InventoryConfig::FETCH_TIMEOUT
}

fn default_parts_timeout() -> Duration {
    PartsConfig::REQUEST_TIMEOUT
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}
