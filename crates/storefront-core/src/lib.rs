//! Storefront Core - Headless inventory search and repair-parts catalog.
//!
//! This crate fetches a dealer's appliance inventory from a slow remote
//! backend, indexes it in memory, and answers partial free-text queries with
//! ranked results. Repeated fetches and queries are absorbed by time-bounded
//! caches. A smaller durable cache holds repair parts per appliance model.
//!
//! It can be used programmatically without any HTTP/RPC layer; see the
//! `storefront-rpc` crate for the JSON-RPC surface.
//!
//! # Example
//!
//! ```rust,ignore
//! use storefront_core::{CatalogService, GatewaySettings};
//!
//! #[tokio::main]
//! async fn main() -> storefront_core::Result<()> {
//!     let service = CatalogService::builder()
//!         .with_inventory_gateway(GatewaySettings::new("https://inv.example/rest", "42", "code"))
//!         .build()?;
//!
//!     service.preload();
//!     let results = service.search("WRF535").await;
//!     println!("Found {} items", results.len());
//!
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod index;
pub mod models;
pub mod network;
pub mod parts;

mod api;

// Re-export commonly used types
pub use cache::{InventoryCache, InventorySnapshot, QueryCache};
pub use config::{GatewaySettings, InventoryConfig, PartsConfig, PartsGatewaySettings, SearchConfig};
pub use error::{Result, StorefrontError};
pub use index::{build_index, SearchIndex};
pub use models::{
    CacheStatus, DiagramDescriptor, IndexFreshness, IndexStatus, InventoryItem, PartRecord,
    PartsByNumber, PartsStatus,
};
pub use network::{HttpInventoryGateway, HttpPartsGateway, InventorySource, PartsSource};
pub use parts::{FileStore, KeyValueStore, MemoryStore, PartMatch, PartsCache, PartsCatalog};

// Re-export builder from api module
pub use api::CatalogServiceBuilder;

use std::sync::{Arc, Mutex};

/// Main entry point for catalog operations.
///
/// Owns the inventory cache, the query cache, and the parts cache. Cheap to
/// clone; clones share all state.
#[derive(Clone)]
pub struct CatalogService {
    inner: Arc<ServiceInner>,
}

struct ServiceInner {
    inventory: InventoryCache,
    queries: Mutex<QueryCache>,
    parts: Arc<PartsCache>,
    /// Present only when a parts service is configured
    parts_catalog: Option<PartsCatalog>,
}

impl CatalogService {
    /// Create a builder for CatalogService.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let service = CatalogService::builder()
    ///     .with_inventory_gateway(settings)
    ///     .parts_dir("./data/parts")
    ///     .build()?;
    /// ```
    pub fn builder() -> CatalogServiceBuilder {
        CatalogServiceBuilder::new()
    }
}
