//! Builder for configuring CatalogService initialization.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::info;

use crate::cache::{InventoryCache, QueryCache};
use crate::config::{GatewaySettings, InventoryConfig, PartsGatewaySettings, SearchConfig};
use crate::error::{Result, StorefrontError};
use crate::network::{HttpInventoryGateway, HttpPartsGateway, InventorySource, PartsSource};
use crate::parts::{FileStore, KeyValueStore, MemoryStore, PartsCache, PartsCatalog};
use crate::{CatalogService, ServiceInner};

enum InventoryBackend {
    Http(GatewaySettings),
    Custom(Arc<dyn InventorySource>),
}

enum PartsBackend {
    Http(PartsGatewaySettings),
    Custom(Arc<dyn PartsSource>),
}

enum PartsStorage {
    Directory(PathBuf),
    Custom(Arc<dyn KeyValueStore>),
}

/// Builder for configuring CatalogService initialization.
///
/// An inventory backend is required. Without a parts backend the parts cache
/// still answers searches over whatever it has persisted, but cannot load new
/// models. Without parts storage the parts cache lives in memory only.
pub struct CatalogServiceBuilder {
    inventory: Option<InventoryBackend>,
    parts: Option<PartsBackend>,
    storage: Option<PartsStorage>,
    auto_create_dirs: bool,
    inventory_ttl: Duration,
    query_cache_capacity: usize,
    query_cache_ttl: Duration,
}

impl Default for CatalogServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogServiceBuilder {
    pub fn new() -> Self {
        Self {
            inventory: None,
            parts: None,
            storage: None,
            auto_create_dirs: false,
            inventory_ttl: InventoryConfig::SNAPSHOT_TTL,
            query_cache_capacity: SearchConfig::QUERY_CACHE_CAPACITY,
            query_cache_ttl: SearchConfig::QUERY_CACHE_TTL,
        }
    }

    /// Fetch inventory from the dealer REST endpoint.
    pub fn with_inventory_gateway(mut self, settings: GatewaySettings) -> Self {
        self.inventory = Some(InventoryBackend::Http(settings));
        self
    }

    /// Fetch inventory from a custom source.
    pub fn with_inventory_source(mut self, source: Arc<dyn InventorySource>) -> Self {
        self.inventory = Some(InventoryBackend::Custom(source));
        self
    }

    pub fn with_parts_gateway(mut self, settings: PartsGatewaySettings) -> Self {
        self.parts = Some(PartsBackend::Http(settings));
        self
    }

    pub fn with_parts_source(mut self, source: Arc<dyn PartsSource>) -> Self {
        self.parts = Some(PartsBackend::Custom(source));
        self
    }

    /// Persist the parts cache as JSON files in `dir`.
    pub fn parts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage = Some(PartsStorage::Directory(dir.into()));
        self
    }

    pub fn parts_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.storage = Some(PartsStorage::Custom(store));
        self
    }

    /// Create the parts directory if it doesn't exist.
    ///
    /// Default: `false` (the directory must exist)
    pub fn auto_create_dirs(mut self, enable: bool) -> Self {
        self.auto_create_dirs = enable;
        self
    }

    /// Default: 60 minutes
    pub fn inventory_ttl(mut self, ttl: Duration) -> Self {
        self.inventory_ttl = ttl;
        self
    }

    /// Default: 100 entries
    pub fn query_cache_capacity(mut self, capacity: usize) -> Self {
        self.query_cache_capacity = capacity;
        self
    }

    /// Default: 20 minutes
    pub fn query_cache_ttl(mut self, ttl: Duration) -> Self {
        self.query_cache_ttl = ttl;
        self
    }

    /// Build the CatalogService instance.
    pub fn build(self) -> Result<CatalogService> {
        let inventory_source: Arc<dyn InventorySource> = match self.inventory {
            Some(InventoryBackend::Http(settings)) => {
                if settings.base_url.trim().is_empty() {
                    return Err(StorefrontError::Config {
                        message: "Inventory base URL is empty".to_string(),
                    });
                }
                Arc::new(HttpInventoryGateway::new(settings)?)
            }
            Some(InventoryBackend::Custom(source)) => source,
            None => {
                return Err(StorefrontError::Config {
                    message: "No inventory backend configured".to_string(),
                })
            }
        };

        let parts_source: Option<Arc<dyn PartsSource>> = match self.parts {
            Some(PartsBackend::Http(settings)) => Some(Arc::new(HttpPartsGateway::new(settings)?)),
            Some(PartsBackend::Custom(source)) => Some(source),
            None => None,
        };

        let store: Arc<dyn KeyValueStore> = match self.storage {
            Some(PartsStorage::Directory(dir)) => {
                if !dir.exists() {
                    if !self.auto_create_dirs {
                        return Err(StorefrontError::Config {
                            message: format!("Parts directory does not exist: {}", dir.display()),
                        });
                    }
                    std::fs::create_dir_all(&dir).map_err(|e| StorefrontError::Io {
                        message: format!("Failed to create directory: {}", dir.display()),
                        path: Some(dir.clone()),
                        source: Some(e),
                    })?;
                }
                Arc::new(FileStore::new(dir))
            }
            Some(PartsStorage::Custom(store)) => store,
            None => Arc::new(MemoryStore::new()),
        };

        let parts = Arc::new(PartsCache::open(store));
        let parts_catalog = parts_source.map(|source| PartsCatalog::new(source, parts.clone()));

        info!(
            "Catalog service ready (inventory TTL {:?}, query cache {} entries / {:?}, parts service {})",
            self.inventory_ttl,
            self.query_cache_capacity,
            self.query_cache_ttl,
            if parts_catalog.is_some() { "configured" } else { "not configured" }
        );

        Ok(CatalogService {
            inner: Arc::new(ServiceInner {
                inventory: InventoryCache::with_ttl(inventory_source, self.inventory_ttl),
                queries: Mutex::new(QueryCache::new(
                    self.query_cache_capacity,
                    self.query_cache_ttl,
                )),
                parts,
                parts_catalog,
            }),
        })
    }
}
