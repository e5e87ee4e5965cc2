//! Repair-parts catalog.
//!
//! A small durable cache of diagram parts per appliance model, plus the
//! model-number to parts-service model-id mapping. Unlike the inventory
//! caches it has no TTL and survives restarts.
//!
//! - [`store`]: durable key-value storage for the two persisted tables
//! - [`PartsCache`]: the in-memory tables, persisted on every mutation
//! - [`PartsCatalog`]: loads a model's parts from the parts service

mod cache;
mod catalog;
pub mod store;

pub use cache::{PartMatch, PartsCache};
pub use catalog::PartsCatalog;
pub use store::{FileStore, KeyValueStore, MemoryStore};

/// Cache key for one model/model-id pair.
pub fn parts_cache_key(model_number: &str, model_id: &str) -> String {
    format!("{}_{}", model_number, model_id)
}
