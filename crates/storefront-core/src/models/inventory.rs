use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::lenient_string;

/// A single inventory record as delivered by the inventory backend.
///
/// Only the four fields the search core reads are modelled. Pricing,
/// availability, and anything else the upstream sends is kept verbatim in
/// `extra` and serialized back out unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    model_number: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    brand: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    description: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    category_major: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl InventoryItem {
    pub fn new(
        model_number: impl Into<String>,
        brand: impl Into<String>,
        description: impl Into<String>,
        category_major: impl Into<String>,
    ) -> Self {
        Self {
            model_number: Some(model_number.into()),
            brand: Some(brand.into()),
            description: Some(description.into()),
            category_major: Some(category_major.into()),
            extra: Map::new(),
        }
    }

    /// Attach an uninterpreted field (price, stock, ...).
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Decode a record from an arbitrary JSON value.
    ///
    /// Returns `None` for non-objects; object records never fail because every
    /// known field is optional and leniently typed.
    pub fn from_value(value: Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value).ok()
    }

    pub fn model_number(&self) -> &str {
        self.model_number.as_deref().unwrap_or_default()
    }

    pub fn brand(&self) -> &str {
        self.brand.as_deref().unwrap_or_default()
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    pub fn category_major(&self) -> &str {
        self.category_major.as_deref().unwrap_or_default()
    }

    pub fn has_model_number(&self) -> bool {
        self.model_number.as_deref().is_some_and(|m| !m.is_empty())
    }

    /// Look up an uninterpreted field by its wire name.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}
