//! Integration tests for the CatalogService public interface.
//!
//! These run the service against a mock inventory backend over HTTP, and
//! against in-process sources where timing or call counts matter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use storefront_core::{
    CatalogService, GatewaySettings, IndexFreshness, InventoryItem, InventorySource,
    PartRecord, PartsByNumber,
};
use tempfile::TempDir;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct CountingSource {
    items: Vec<InventoryItem>,
    calls: AtomicUsize,
}

impl CountingSource {
    fn new(items: Vec<InventoryItem>) -> Arc<Self> {
        Arc::new(Self {
            items,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InventorySource for CountingSource {
    async fn fetch_inventory(&self) -> Vec<InventoryItem> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.items.clone()
    }

    async fn fetch_inventory_changes(&self, _since: DateTime<Utc>) -> Vec<InventoryItem> {
        self.items.iter().take(1).cloned().collect()
    }
}

fn fridge_json() -> serde_json::Value {
    json!({
        "modelNumber": "WRF535SWHZ",
        "brand": "WHIRLPOOL",
        "description": "French Door Refrigerator",
        "categoryMajor": "Refrigerators",
        "price": 1899.0
    })
}

async fn mock_inventory(body: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("resource", "inventory"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;
    server
}

fn service_for(server: &MockServer) -> CatalogService {
    CatalogService::builder()
        .with_inventory_gateway(GatewaySettings::new(server.uri(), "42", "code"))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_end_to_end_single_item() {
    let server = mock_inventory(json!({"data": [fridge_json()]})).await;
    let service = service_for(&server);

    for query in ["WRF535SWHZ", "whirlpool", "refrigerator"] {
        let results = service.search(query).await;
        assert_eq!(results.len(), 1, "query {query}");
        assert_eq!(results[0].model_number(), "WRF535SWHZ");
        assert_eq!(results[0].field("price"), Some(&json!(1899.0)));
    }
    assert!(service.search("xyz").await.is_empty());

    // One fetch served every query
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_malformed_envelope_yields_no_results() {
    let server = mock_inventory(json!({"status": "ok"})).await;
    let service = service_for(&server);

    assert!(service.get_inventory().await.is_empty());
    assert!(service.search("whirlpool").await.is_empty());

    let status = service.get_cache_status();
    assert!(!status.inventory_cached);
    assert_eq!(status.search_cache_size, 0);
}

#[tokio::test]
async fn test_short_query_never_fetches() {
    let source = CountingSource::new(vec![InventoryItem::new("A1", "GE", "Range", "Cooking")]);
    let service = CatalogService::builder()
        .with_inventory_source(source.clone())
        .build()
        .unwrap();

    assert!(service.search("a").await.is_empty());
    assert!(service.search("").await.is_empty());
    assert_eq!(source.calls(), 0);
    assert_eq!(service.index_freshness(), IndexFreshness::Empty);
}

#[tokio::test]
async fn test_concurrent_searches_share_one_fetch() {
    let source = CountingSource::new(vec![
        InventoryItem::new("WRF535SWHZ", "WHIRLPOOL", "French Door Refrigerator", "Refrigerators"),
        InventoryItem::new("GE-JB645", "GE", "Electric Range", "Cooking"),
    ]);
    let service = CatalogService::builder()
        .with_inventory_source(source.clone())
        .build()
        .unwrap();

    let preload = service.preload();
    let (a, b, c) = tokio::join!(
        service.search("whirlpool"),
        service.search("range"),
        service.get_inventory()
    );
    preload.await.unwrap();

    assert_eq!(source.calls(), 1);
    assert_eq!(a.len(), 1);
    assert_eq!(b[0].model_number(), "GE-JB645");
    assert_eq!(c.len(), 2);
}

#[tokio::test]
async fn test_query_cache_and_status() {
    let source = CountingSource::new(vec![InventoryItem::new(
        "WRF535SWHZ",
        "WHIRLPOOL",
        "French Door Refrigerator",
        "Refrigerators",
    )]);
    let service = CatalogService::builder()
        .with_inventory_source(source.clone())
        .query_cache_capacity(2)
        .build()
        .unwrap();

    service.search("Whirlpool").await;
    service.search("  whirlpool ").await;
    assert_eq!(service.get_cache_status().search_cache_size, 1);

    service.search("french").await;
    service.search("door").await;
    let status = service.get_cache_status();
    assert_eq!(status.search_cache_size, 2);
    assert!(status.inventory_cached);
    assert!(status.index_available);
    assert!(status.inventory_cache_age.is_some());
    assert_eq!(service.index_freshness(), IndexFreshness::Fresh);

    let index = service.index_status();
    assert_eq!(index.item_count, 1);
    assert!(!index.fetch_in_flight);

    service.clear_cache();
    let status = service.get_cache_status();
    assert_eq!(status.search_cache_size, 0);
    assert!(!status.inventory_cached);
    assert!(!status.index_available);
    assert_eq!(status.index_age, None);

    service.search("whirlpool").await;
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_cache_status_serializes_camel_case() {
    let source = CountingSource::new(vec![]);
    let service = CatalogService::builder()
        .with_inventory_source(source)
        .build()
        .unwrap();

    let value = serde_json::to_value(service.get_cache_status()).unwrap();
    assert_eq!(
        value,
        json!({
            "inventoryCached": false,
            "inventoryCacheAge": null,
            "searchCacheSize": 0,
            "indexAvailable": false,
            "indexAge": null
        })
    );
}

#[tokio::test]
async fn test_inventory_changes_passthrough() {
    let source = CountingSource::new(vec![
        InventoryItem::new("A1", "GE", "Range", "Cooking"),
        InventoryItem::new("B2", "GE", "Washer", "Laundry"),
    ]);
    let service = CatalogService::builder()
        .with_inventory_source(source.clone())
        .build()
        .unwrap();

    let changes = service.fetch_inventory_changes(Utc::now()).await;
    assert_eq!(changes.len(), 1);
    // Changes do not go through the snapshot cache
    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn test_parts_cache_persists_across_services() {
    let temp_dir = TempDir::new().unwrap();
    let source = CountingSource::new(vec![]);

    {
        let service = CatalogService::builder()
            .with_inventory_source(source.clone())
            .parts_dir(temp_dir.path())
            .build()
            .unwrap();

        let mut parts = PartsByNumber::new();
        parts.insert("A1".into(), PartRecord::new("A1", "seal kit"));
        parts.insert("B2".into(), PartRecord::new("B2", "motor"));
        service.add_model_id_mapping("WRF535SWHZ", "9001");
        service.parts().add_parts_for_model("WRF535SWHZ", "9001", parts);
    }

    let service = CatalogService::builder()
        .with_inventory_source(source)
        .parts_dir(temp_dir.path())
        .build()
        .unwrap();

    assert_eq!(service.get_model_id("WRF535SWHZ").as_deref(), Some("9001"));
    let status = service.parts_status();
    assert_eq!(status.cached_models, 1);
    assert_eq!(status.cached_parts, 2);

    let hits = service.search_parts("seal", None);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].part.part_number(), "A1");

    // No parts service configured
    assert!(service.load_model_parts("WRF535SWHZ", "9001").await.is_err());
}
