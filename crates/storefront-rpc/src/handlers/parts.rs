//! Repair-parts handlers.

use super::{get_id_param, get_str_param, require_str_param};
use crate::server::AppState;
use serde_json::{json, Value};
use storefront_core::StorefrontError;

pub async fn search_parts(state: &AppState, params: &Value) -> storefront_core::Result<Value> {
    let term = require_str_param(params, "term", "term")?;
    let manufacturer = get_str_param(params, "manufacturer_filter", "manufacturerFilter");
    let matches = state.service.search_parts(&term, manufacturer);
    Ok(serde_json::to_value(matches)?)
}

pub async fn get_model_id(state: &AppState, params: &Value) -> storefront_core::Result<Value> {
    let model_number = require_str_param(params, "model_number", "modelNumber")?;
    let model_id = state.service.get_model_id(&model_number);
    Ok(json!({
        "success": true,
        "model_number": model_number,
        "model_id": model_id
    }))
}

pub async fn add_model_id_mapping(
    state: &AppState,
    params: &Value,
) -> storefront_core::Result<Value> {
    let model_number = require_str_param(params, "model_number", "modelNumber")?;
    let model_id = get_id_param(params, "model_id", "modelId").ok_or_else(|| {
        StorefrontError::InvalidParams {
            message: "Missing required parameter: model_id".to_string(),
        }
    })?;
    state.service.add_model_id_mapping(&model_number, &model_id);
    Ok(json!({"success": true}))
}

pub async fn get_diagrams(state: &AppState, params: &Value) -> storefront_core::Result<Value> {
    let (model_number, model_id) = resolve_model(state, params)?;
    let diagrams = state.service.get_diagrams(&model_number, &model_id).await?;
    Ok(serde_json::to_value(diagrams)?)
}

pub async fn load_model_parts(state: &AppState, params: &Value) -> storefront_core::Result<Value> {
    let (model_number, model_id) = resolve_model(state, params)?;
    let count = state
        .service
        .load_model_parts(&model_number, &model_id)
        .await?;
    Ok(json!({
        "success": true,
        "model_number": model_number,
        "model_id": model_id,
        "parts_loaded": count
    }))
}

/// Model number plus model id, falling back to the stored mapping when the
/// caller omits the id.
fn resolve_model(state: &AppState, params: &Value) -> storefront_core::Result<(String, String)> {
    let model_number = require_str_param(params, "model_number", "modelNumber")?;
    let model_id = get_id_param(params, "model_id", "modelId")
        .or_else(|| state.service.get_model_id(&model_number))
        .ok_or_else(|| StorefrontError::InvalidParams {
            message: format!("No model_id given or known for {}", model_number),
        })?;
    Ok((model_number, model_id))
}
