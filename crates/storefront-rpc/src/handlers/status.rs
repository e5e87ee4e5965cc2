//! Cache and index status handlers.

use crate::server::AppState;
use serde_json::Value;

pub async fn get_cache_status(state: &AppState, _params: &Value) -> storefront_core::Result<Value> {
    Ok(serde_json::to_value(state.service.get_cache_status())?)
}

pub async fn get_index_status(state: &AppState, _params: &Value) -> storefront_core::Result<Value> {
    Ok(serde_json::to_value(state.service.index_status())?)
}

pub async fn get_parts_status(state: &AppState, _params: &Value) -> storefront_core::Result<Value> {
    Ok(serde_json::to_value(state.service.parts_status())?)
}
