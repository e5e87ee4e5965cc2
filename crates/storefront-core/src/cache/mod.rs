//! In-memory caches for the inventory search path.
//!
//! - [`InventoryCache`]: the single inventory snapshot plus its search index,
//!   with single-flight fetching
//! - [`QueryCache`]: recent query results, FIFO-bounded with a per-entry TTL

mod inventory;
mod query;

pub use inventory::{InventoryCache, InventorySnapshot};
pub use query::QueryCache;
