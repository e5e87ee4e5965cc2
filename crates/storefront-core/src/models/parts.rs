use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::{lenient_f64, lenient_i64, lenient_string};

/// Parts for one model/diagram pair, keyed by part number.
pub type PartsByNumber = BTreeMap<String, PartRecord>;

/// One exploded-view diagram section for an appliance model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramDescriptor {
    #[serde(default, deserialize_with = "lenient_string")]
    pub section_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub diagram_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub diagram_small_image: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub diagram_large_image: Option<String>,
}

/// A repair part as returned by the diagram-parts endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub part_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub part_description: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub list_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub qty_total: Option<i64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub item_number: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PartRecord {
    pub fn new(part_number: impl Into<String>, part_description: impl Into<String>) -> Self {
        Self {
            part_number: Some(part_number.into()),
            part_description: Some(part_description.into()),
            ..Default::default()
        }
    }

    pub fn part_number(&self) -> &str {
        self.part_number.as_deref().unwrap_or_default()
    }

    pub fn part_description(&self) -> &str {
        self.part_description.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_part_record_lenient_numbers() {
        let part: PartRecord = serde_json::from_value(json!({
            "partNumber": "W10295370A",
            "partDescription": "Water filter",
            "price": "49.99",
            "listPrice": 59.5,
            "qtyTotal": "12",
            "itemNumber": 7
        }))
        .unwrap();

        assert_eq!(part.part_number(), "W10295370A");
        assert_eq!(part.price, Some(49.99));
        assert_eq!(part.list_price, Some(59.5));
        assert_eq!(part.qty_total, Some(12));
        assert_eq!(part.item_number.as_deref(), Some("7"));
    }

    #[test]
    fn test_diagram_descriptor_numeric_id() {
        let diagram: DiagramDescriptor = serde_json::from_value(json!({
            "sectionName": "Door Parts",
            "diagramId": 3391
        }))
        .unwrap();
        assert_eq!(diagram.diagram_id.as_deref(), Some("3391"));
        assert!(diagram.diagram_large_image.is_none());
    }
}
