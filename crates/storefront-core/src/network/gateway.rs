//! Inventory backend gateway.
//!
//! The inventory REST endpoint answers slowly and with no stable envelope.
//! Every failure (transport, timeout, status, body) collapses to an empty
//! record list here, so callers above the gateway never see an error.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::client::HttpClient;
use crate::config::{GatewaySettings, InventoryConfig};
use crate::models::InventoryItem;
use crate::Result;

/// Source of inventory records.
///
/// Implementations must never fail; an unreachable or misbehaving upstream
/// yields an empty list.
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// Fetch the full inventory.
    async fn fetch_inventory(&self) -> Vec<InventoryItem>;

    /// Fetch records changed since `since`.
    async fn fetch_inventory_changes(&self, since: DateTime<Utc>) -> Vec<InventoryItem>;
}

/// Inventory gateway backed by the dealer REST endpoint.
#[derive(Debug, Clone)]
pub struct HttpInventoryGateway {
    client: HttpClient,
    settings: GatewaySettings,
}

impl HttpInventoryGateway {
    pub fn new(settings: GatewaySettings) -> Result<Self> {
        let client = HttpClient::with_timeout(settings.timeout)?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    fn resource_url(&self, resource: &str, extra: &[(&str, String)]) -> String {
        let separator = if self.settings.base_url.contains('?') {
            '&'
        } else {
            '?'
        };
        let mut url = format!(
            "{}{}format=json&resource={}&dealerid={}&restcode={}",
            self.settings.base_url,
            separator,
            urlencoding::encode(resource),
            urlencoding::encode(&self.settings.dealer_id),
            urlencoding::encode(&self.settings.rest_code),
        );
        for (key, value) in extra {
            url.push('&');
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }

    async fn fetch(&self, resource: &str, extra: &[(&str, String)]) -> Vec<InventoryItem> {
        let url = self.resource_url(resource, extra);
        match self.client.get_json::<Value>(&url).await {
            Ok(body) => unwrap_envelope(body),
            Err(e) => {
                warn!("Failed to fetch {}: {}", resource, e);
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl InventorySource for HttpInventoryGateway {
    async fn fetch_inventory(&self) -> Vec<InventoryItem> {
        info!("Fetching inventory from {}", self.settings.base_url);
        let items = self.fetch(InventoryConfig::RESOURCE, &[]).await;
        info!("Fetched {} inventory records", items.len());
        items
    }

    async fn fetch_inventory_changes(&self, since: DateTime<Utc>) -> Vec<InventoryItem> {
        let since = since.to_rfc3339_opts(SecondsFormat::Secs, true);
        debug!("Fetching inventory changes since {}", since);
        self.fetch(InventoryConfig::CHANGES_RESOURCE, &[("since", since)])
            .await
    }
}

/// Extract the record list from an inventory response body.
///
/// Looks for an array under `data`, then `items`, then `inventory`; a bare
/// top-level array is used as is. Any other shape yields an empty list.
/// Entries that are not JSON objects are dropped.
pub fn unwrap_envelope(body: Value) -> Vec<InventoryItem> {
    let records = match body {
        Value::Array(records) => records,
        Value::Object(mut envelope) => {
            let found = ["data", "items", "inventory"]
                .iter()
                .find_map(|key| match envelope.remove(*key) {
                    Some(Value::Array(records)) => Some(records),
                    _ => None,
                });
            match found {
                Some(records) => records,
                None => {
                    warn!(
                        "Unrecognized inventory envelope (keys: {:?}), treating as empty",
                        envelope.keys().collect::<Vec<_>>()
                    );
                    return Vec::new();
                }
            }
        }
        other => {
            warn!("Unrecognized inventory body of type {}", json_type(&other));
            return Vec::new();
        }
    };

    let total = records.len();
    let items: Vec<InventoryItem> = records
        .into_iter()
        .filter_map(InventoryItem::from_value)
        .collect();
    if items.len() < total {
        debug!("Skipped {} non-object inventory records", total - items.len());
    }
    items
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn record(model: &str) -> Value {
        json!({"modelNumber": model, "brand": "GE", "description": "Range"})
    }

    #[test]
    fn test_envelope_priority() {
        let items = unwrap_envelope(json!({
            "items": [record("ITEMS")],
            "data": [record("DATA")],
            "inventory": [record("INV")]
        }));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].model_number(), "DATA");

        let items = unwrap_envelope(json!({"inventory": [record("INV")], "items": [record("ITEMS")]}));
        assert_eq!(items[0].model_number(), "ITEMS");

        let items = unwrap_envelope(json!({"inventory": [record("INV")]}));
        assert_eq!(items[0].model_number(), "INV");
    }

    #[test]
    fn test_envelope_bare_array() {
        let items = unwrap_envelope(json!([record("A1"), record("B2")]));
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].model_number(), "B2");
    }

    #[test]
    fn test_envelope_unrecognized_shapes() {
        assert!(unwrap_envelope(json!({"status": "ok"})).is_empty());
        assert!(unwrap_envelope(json!("inventory")).is_empty());
        assert!(unwrap_envelope(json!(null)).is_empty());
        // A non-array under a known key falls through to the next key
        let items = unwrap_envelope(json!({"data": "none", "items": [record("X")]}));
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_envelope_skips_non_object_records() {
        let items = unwrap_envelope(json!([record("A1"), "junk", 42, record("B2")]));
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_resource_url() {
        let gateway =
            HttpInventoryGateway::new(GatewaySettings::new("https://inv.example/rest", "42", "a&b"))
                .unwrap();
        assert_eq!(
            gateway.resource_url("inventory", &[]),
            "https://inv.example/rest?format=json&resource=inventory&dealerid=42&restcode=a%26b"
        );

        let gateway =
            HttpInventoryGateway::new(GatewaySettings::new("https://inv.example/rest?v=2", "42", "x"))
                .unwrap();
        assert!(gateway
            .resource_url("inventory", &[])
            .starts_with("https://inv.example/rest?v=2&format=json"));
    }

    #[tokio::test]
    async fn test_fetch_inventory_from_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest"))
            .and(query_param("resource", "inventory"))
            .and(query_param("dealerid", "42"))
            .and(query_param("restcode", "secret"))
            .and(query_param("format", "json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": [record("WRF535SWHZ")]})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let gateway = HttpInventoryGateway::new(GatewaySettings::new(
            format!("{}/rest", server.uri()),
            "42",
            "secret",
        ))
        .unwrap();
        let items = gateway.fetch_inventory().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].model_number(), "WRF535SWHZ");
    }

    #[tokio::test]
    async fn test_status_ok_body_yields_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .mount(&server)
            .await;

        let gateway =
            HttpInventoryGateway::new(GatewaySettings::new(server.uri(), "42", "secret")).unwrap();
        assert!(gateway.fetch_inventory().await.is_empty());
    }

    #[tokio::test]
    async fn test_failures_degrade_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!([record("A1")])))
            .mount(&server)
            .await;

        let gateway =
            HttpInventoryGateway::new(GatewaySettings::new(server.uri(), "42", "secret")).unwrap();
        assert!(gateway.fetch_inventory().await.is_empty());

        // Nothing listening on this port
        let gateway = HttpInventoryGateway::new(
            GatewaySettings::new("http://127.0.0.1:9", "42", "secret")
                .with_timeout(Duration::from_secs(2)),
        )
        .unwrap();
        assert!(gateway.fetch_inventory().await.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_inventory_changes_sends_since() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("resource", "inventorychanges"))
            .and(query_param("since", "2024-03-01T12:00:00Z"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [record("C3")]})))
            .expect(1)
            .mount(&server)
            .await;

        let gateway =
            HttpInventoryGateway::new(GatewaySettings::new(server.uri(), "42", "secret")).unwrap();
        let since = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let items = gateway.fetch_inventory_changes(since).await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].model_number(), "C3");
    }
}
