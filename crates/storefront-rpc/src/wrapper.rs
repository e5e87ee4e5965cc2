//! Response wrapping for frontend compatibility.
//!
//! The frontend expects list results in the format `{success: bool, <key>: [...]}`.
//! Handlers return raw data; this module wraps it per method.

use serde_json::{json, Value};

/// Wrap handler results to match the frontend's expected format.
pub fn wrap_response(method: &str, result: Value) -> Value {
    let key = match method {
        "search" | "fetch_inventory_changes" => "items",
        "search_parts" => "parts",
        "get_diagrams" => "diagrams",
        // Status objects and handlers that build their own envelope
        _ => return result,
    };

    json!({
        "success": true,
        key: if result.is_null() { json!([]) } else { result }
    })
}
