//! API implementation submodules.
//!
//! Each submodule contains `impl CatalogService` blocks that extend the public
//! API. The struct definition remains in `lib.rs`.

mod builder;
mod inventory;
mod parts;

pub use builder::CatalogServiceBuilder;
