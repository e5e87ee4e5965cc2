//! Inventory search and cache handlers.

use super::require_str_param;
use crate::server::AppState;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use storefront_core::StorefrontError;

pub async fn search(state: &AppState, params: &Value) -> storefront_core::Result<Value> {
    let query = require_str_param(params, "query", "query")?;
    let results = state.service.search(&query).await;
    Ok(serde_json::to_value(results)?)
}

pub async fn preload(state: &AppState, _params: &Value) -> storefront_core::Result<Value> {
    // Fire-and-forget; the UI polls get_cache_status
    state.service.preload();
    Ok(json!({"success": true, "started": true}))
}

pub async fn clear_cache(state: &AppState, _params: &Value) -> storefront_core::Result<Value> {
    state.service.clear_cache();
    Ok(json!({"success": true}))
}

pub async fn fetch_inventory_changes(
    state: &AppState,
    params: &Value,
) -> storefront_core::Result<Value> {
    let since = require_str_param(params, "since", "since")?;
    let since = DateTime::parse_from_rfc3339(&since)
        .map_err(|e| StorefrontError::InvalidParams {
            message: format!("Invalid 'since' timestamp {:?}: {}", since, e),
        })?
        .with_timezone(&Utc);

    let changes = state.service.fetch_inventory_changes(since).await;
    Ok(serde_json::to_value(changes)?)
}
