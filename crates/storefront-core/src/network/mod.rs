//! Network access to the two upstream backends.
//!
//! This module provides:
//! - A thin HTTP client wrapper with a single-attempt timeout
//! - The inventory gateway, which degrades to empty on any failure
//! - The repair-parts gateway, which reports failures to its caller

mod client;
mod gateway;
mod parts_gateway;

pub use client::HttpClient;
pub use gateway::{unwrap_envelope, HttpInventoryGateway, InventorySource};
pub use parts_gateway::{HttpPartsGateway, PartsSource};
