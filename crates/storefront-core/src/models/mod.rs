//! Data types shared across the catalog: inventory records, parts records,
//! and status responses.
//!
//! Upstream records carry no schema. Fields the library reads are declared as
//! optional and decoded leniently (strings, numbers, and booleans all become
//! text); everything else rides along untouched in an extension map.

mod inventory;
mod parts;
mod responses;

pub use inventory::InventoryItem;
pub use parts::{DiagramDescriptor, PartRecord, PartsByNumber};
pub use responses::{CacheStatus, IndexFreshness, IndexStatus, PartsStatus};

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Render a loosely-typed JSON scalar as text.
///
/// Objects and arrays have no sensible text form and are treated as absent.
pub(crate) fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_text))
}

pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().trim_start_matches('$').parse().ok(),
        _ => None,
    })
}

pub(crate) fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
