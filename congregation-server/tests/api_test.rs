//! HTTP API tests.
//!
//! Drives the full router with an in-memory store (or none, or one that
//! always fails) and checks status codes and response bodies.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use congregation_server::db::{CollectionMap, DocumentStore, MemoryStore, StoreError};
use congregation_server::models::{Document, SchemaKind};
use congregation_server::{build_router, AppState, ConfigPresence, ServerConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Store whose every operation fails
struct FailingStore;

#[async_trait]
impl DocumentStore for FailingStore {
    async fn get_documents(&self, _collection: &str, _limit: usize) -> Result<Vec<Document>, StoreError> {
        Err(StoreError::Backend("connection refused".into()))
    }

    async fn insert_document(&self, _collection: &str, _doc: Document) -> Result<String, StoreError> {
        Err(StoreError::Backend("connection refused".into()))
    }

    async fn list_collections(&self, _limit: usize) -> Result<Vec<String>, StoreError> {
        Err(StoreError::Backend(
            "server selection timeout after 30000 ms while contacting the primary".into(),
        ))
    }
}

fn app_with(store: Option<Arc<dyn DocumentStore>>, presence: ConfigPresence) -> Router {
    let state = AppState::new(store, CollectionMap::default(), presence);
    build_router(state, &ServerConfig::default())
}

fn memory_app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let app = app_with(Some(store.clone() as Arc<dyn DocumentStore>), ConfigPresence::default());
    (app, store)
}

fn doc(value: Value) -> Document {
    value.as_object().cloned().expect("test document must be an object")
}

async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .expect("failed to make request");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    (status, bytes.to_vec())
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, bytes) = get(app, uri).await;
    let body = serde_json::from_slice(&bytes).expect("response should be valid JSON");
    (status, body)
}

async fn post_contact(app: Router, body: impl Into<Body>) -> (StatusCode, Value) {
    post_contact_as(app, Some("application/json"), body).await
}

async fn post_contact_as(
    app: Router,
    content_type: Option<&str>,
    body: impl Into<Body>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method("POST").uri("/api/contact");
    if let Some(content_type) = content_type {
        request = request.header("content-type", content_type);
    }
    let response = app
        .oneshot(request.body(body.into()).unwrap())
        .await
        .expect("failed to make request");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    (status, serde_json::from_slice(&bytes).expect("response should be valid JSON"))
}

fn contact_payload() -> Value {
    json!({
        "name": "Maria",
        "email": "maria@example.org",
        "subject": "Visiting",
        "message": "What time does the Sunday meeting start?",
    })
}

fn stats_doc(publishers: i64) -> Document {
    doc(json!({
        "publishers": publishers,
        "pioneers": 7,
        "youngest_publisher": "Tim",
        "youngest_age": 9,
        "oldest_publisher": "Edith",
        "oldest_age": 94,
    }))
}

// === Root ===

#[tokio::test]
async fn root_reports_running() {
    let (app, _) = memory_app();
    let (status, body) = get_json(app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Congregation API running" }));
}

// === Stats ===

#[tokio::test]
async fn stats_are_capped_at_five_in_storage_order() {
    let (app, store) = memory_app();
    for n in 0..7 {
        store.insert_raw("congregationstats", stats_doc(n)).unwrap();
    }

    let (status, body) = get_json(app, "/api/stats").await;
    assert_eq!(status, StatusCode::OK);

    let items = body.as_array().expect("stats should be an array");
    assert_eq!(items.len(), 5);
    let publishers: Vec<_> = items.iter().map(|i| i["publishers"].as_i64().unwrap()).collect();
    assert_eq!(publishers, vec![0, 1, 2, 3, 4]);
}

#[tokio::test]
async fn stats_strip_storage_fields_and_keep_nulls() {
    let (app, store) = memory_app();
    let mut entry = stats_doc(50);
    entry.insert("created_at".into(), json!("2024-05-01T10:00:00Z"));
    entry.remove("oldest_age");
    store.insert_raw("congregationstats", entry).unwrap();

    let (_, body) = get_json(app, "/api/stats").await;
    let item = &body[0];

    assert!(item.get("_id").is_none());
    assert!(item.get("created_at").is_none());
    assert_eq!(item["oldest_age"], Value::Null);
    assert_eq!(item["updated_by"], Value::Null);
}

#[tokio::test]
async fn stats_empty_collection_is_empty_array() {
    let (app, _) = memory_app();
    let (status, body) = get_json(app, "/api/stats").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn malformed_stored_stats_is_plain_server_error() {
    let (app, store) = memory_app();
    store
        .insert_raw("congregationstats", doc(json!({ "publishers": "many" })))
        .unwrap();

    let (status, bytes) = get(app, "/api/stats").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(bytes, b"Internal Server Error");
}

// === Gallery ===

#[tokio::test]
async fn gallery_is_capped_then_sorted_by_order() {
    let (app, store) = memory_app();
    // Ten images, orders descending; only the first eight stored are returned.
    for order in (0..10).rev() {
        store
            .insert_raw(
                "galleryimage",
                doc(json!({ "url": format!("https://example.org/{}.jpg", order), "order": order })),
            )
            .unwrap();
    }

    let (status, body) = get_json(app, "/api/gallery").await;
    assert_eq!(status, StatusCode::OK);

    let orders: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["order"].as_i64().unwrap())
        .collect();
    assert_eq!(orders, vec![2, 3, 4, 5, 6, 7, 8, 9]);
}

#[tokio::test]
async fn gallery_round_trip_places_new_image_by_order() {
    let (app, store) = memory_app();
    for (order, name) in [(5, "porch"), (1, "hall"), (3, "garden")] {
        store
            .insert_raw(
                "galleryimage",
                doc(json!({
                    "url": format!("https://example.org/{}.jpg", name),
                    "caption": name,
                    "order": order,
                })),
            )
            .unwrap();
    }

    let (_, body) = get_json(app, "/api/gallery").await;
    let captions: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["caption"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(captions, vec!["hall", "garden", "porch"]);
}

#[tokio::test]
async fn gallery_defaults_missing_order() {
    let (app, store) = memory_app();
    store
        .insert_raw("galleryimage", doc(json!({ "url": "https://example.org/a.jpg" })))
        .unwrap();

    let (_, body) = get_json(app, "/api/gallery").await;
    assert_eq!(
        body,
        json!([{ "url": "https://example.org/a.jpg", "caption": null, "order": 0 }])
    );
}

#[tokio::test]
async fn gallery_uses_configured_collection() {
    let store = Arc::new(MemoryStore::new());
    store
        .insert_raw("photos", doc(json!({ "url": "https://example.org/a.jpg" })))
        .unwrap();
    let collections = CollectionMap::default().with(SchemaKind::GalleryImage, "photos");
    let state = AppState::new(Some(store as Arc<dyn DocumentStore>), collections, ConfigPresence::default());
    let app = build_router(state, &ServerConfig::default());

    let (_, body) = get_json(app, "/api/gallery").await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

// === Contact ===

#[tokio::test]
async fn valid_contact_is_stored_and_acknowledged() {
    let (app, store) = memory_app();
    let (status, body) = post_contact(app, contact_payload().to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(!body["id"].as_str().unwrap().is_empty());
    assert_eq!(store.count("contactmessage"), 1);

    let stored = store.get_documents("contactmessage", 1).await.unwrap();
    assert_eq!(stored[0]["_id"], body["id"]);
    assert_eq!(stored[0]["name"], "Maria");
}

#[tokio::test]
async fn contact_violations_are_422_and_store_nothing() {
    let cases = [
        ("name", json!("M")),
        ("email", json!("maria-at-example.org")),
        ("email", json!("maria..s@example.org")),
        ("email", json!(".maria@example.org")),
        ("email", json!("maria@church.test")),
        ("email", json!("maria@example.123")),
        ("subject", json!("?")),
        ("message", json!("")),
        ("message", json!("m".repeat(2001))),
    ];

    for (field, value) in cases {
        let (app, store) = memory_app();
        let mut payload = contact_payload();
        payload[field] = value;

        let (status, body) = post_contact(app, payload.to_string()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "field {}", field);
        assert_eq!(body["detail"][0]["loc"], json!(["body", field]));
        assert_eq!(store.count("contactmessage"), 0);
    }
}

#[tokio::test]
async fn contact_reports_every_missing_field() {
    let (app, _) = memory_app();
    let (status, body) = post_contact(app, "{}").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let locs: Vec<_> = body["detail"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["loc"][1].as_str().unwrap().to_string())
        .collect();
    assert_eq!(locs, vec!["name", "email", "subject", "message"]);
}

#[tokio::test]
async fn contact_too_short_message_has_pydantic_shape() {
    let (app, _) = memory_app();
    let mut payload = contact_payload();
    payload["message"] = json!("hey");

    let (_, body) = post_contact(app, payload.to_string()).await;
    assert_eq!(
        body["detail"][0],
        json!({
            "type": "string_too_short",
            "loc": ["body", "message"],
            "msg": "String should have at least 5 characters",
            "input": "hey",
            "ctx": { "min_length": 5 },
        })
    );
}

#[tokio::test]
async fn contact_invalid_json_is_422() {
    let (app, _) = memory_app();
    let (status, body) = post_contact(app, "{\"name\": ").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["type"], "json_invalid");
}

#[tokio::test]
async fn contact_array_body_is_422() {
    let (app, _) = memory_app();
    let (status, body) = post_contact(app, "[]").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["type"], "model_attributes_type");
    assert_eq!(body["detail"][0]["loc"], json!(["body"]));
}

#[tokio::test]
async fn contact_non_json_content_type_is_422() {
    let (app, store) = memory_app();
    let raw = contact_payload().to_string();
    let (status, body) = post_contact_as(app, Some("text/plain"), raw.clone()).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["type"], "model_attributes_type");
    assert_eq!(body["detail"][0]["loc"], json!(["body"]));
    assert_eq!(body["detail"][0]["input"], json!(raw));
    assert_eq!(store.count("contactmessage"), 0);
}

#[tokio::test]
async fn contact_accepts_json_suffix_and_missing_content_type() {
    for content_type in [None, Some("application/vnd.site+json; charset=utf-8")] {
        let (app, store) = memory_app();
        let (status, _) = post_contact_as(app, content_type, contact_payload().to_string()).await;

        assert_eq!(status, StatusCode::OK, "content type {:?}", content_type);
        assert_eq!(store.count("contactmessage"), 1);
    }
}

#[tokio::test]
async fn contact_oversized_body_is_413() {
    let (app, store) = memory_app();
    let mut payload = contact_payload();
    payload["message"] = json!("m".repeat(3 * 1024 * 1024));

    let (status, _) = post_contact(app, payload.to_string()).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(store.count("contactmessage"), 0);
}

#[tokio::test]
async fn contact_ignores_extra_fields() {
    let (app, store) = memory_app();
    let mut payload = contact_payload();
    payload["phone"] = json!("555-0100");

    let (status, _) = post_contact(app, payload.to_string()).await;
    assert_eq!(status, StatusCode::OK);

    let stored = store.get_documents("contactmessage", 1).await.unwrap();
    assert!(stored[0].get("phone").is_none());
}

#[tokio::test]
async fn contact_insert_failure_surfaces_error_text() {
    let app = app_with(Some(Arc::new(FailingStore) as Arc<dyn DocumentStore>), ConfigPresence::default());
    let (status, body) = post_contact(app, contact_payload().to_string()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "detail": "connection refused" }));
}

// === No database configured ===

#[tokio::test]
async fn data_routes_report_not_configured() {
    for uri in ["/api/stats", "/api/gallery"] {
        let app = app_with(None, ConfigPresence::default());
        let (status, body) = get_json(app, uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "detail": "Database not configured" }));
    }

    let app = app_with(None, ConfigPresence::default());
    let (status, body) = post_contact(app, contact_payload().to_string()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "detail": "Database not configured" }));
}

#[tokio::test]
async fn invalid_contact_is_422_even_without_database() {
    let app = app_with(None, ConfigPresence::default());
    let (status, _) = post_contact(app, "{}").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn read_failure_is_plain_server_error() {
    let app = app_with(Some(Arc::new(FailingStore) as Arc<dyn DocumentStore>), ConfigPresence::default());
    let (status, bytes) = get(app, "/api/gallery").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(bytes, b"Internal Server Error");
}

// === Diagnostics ===

#[tokio::test]
async fn diagnostics_without_database() {
    let app = app_with(None, ConfigPresence::default());
    let (status, body) = get_json(app, "/test").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "backend": "✅ Running",
            "database": "⚠️  Available but not initialized",
            "database_url": "❌ Not Set",
            "database_name": "❌ Not Set",
            "connection_status": "Not Connected",
            "collections": [],
        })
    );
}

#[tokio::test]
async fn diagnostics_with_working_database() {
    let store = Arc::new(MemoryStore::new());
    store
        .insert_raw("galleryimage", doc(json!({ "url": "https://example.org/a.jpg" })))
        .unwrap();
    let presence = ConfigPresence {
        database_url: true,
        database_name: false,
    };
    let app = app_with(Some(store as Arc<dyn DocumentStore>), presence);

    let (status, body) = get_json(app, "/test").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "✅ Connected & Working");
    assert_eq!(body["connection_status"], "Connected");
    assert_eq!(body["database_url"], "✅ Set");
    assert_eq!(body["database_name"], "❌ Not Set");
    assert_eq!(body["collections"], json!(["galleryimage"]));
}

#[tokio::test]
async fn diagnostics_with_failing_database_stays_200() {
    let app = app_with(Some(Arc::new(FailingStore) as Arc<dyn DocumentStore>), ConfigPresence::default());
    let (status, body) = get_json(app, "/test").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["database"],
        "⚠️  Connected but Error: server selection timeout after 30000 ms while cont"
    );
    assert_eq!(body["collections"], json!([]));
}

#[tokio::test]
async fn diagnostics_caps_collections_at_ten() {
    let store = Arc::new(MemoryStore::new());
    for n in 0..12 {
        store.insert_raw(&format!("c{:02}", n), Document::new()).unwrap();
    }
    let app = app_with(Some(store as Arc<dyn DocumentStore>), ConfigPresence::default());

    let (_, body) = get_json(app, "/test").await;
    assert_eq!(body["collections"].as_array().unwrap().len(), 10);
}

// === CORS ===

async fn cors_request(app: Router, method: &str, origin: &str) -> axum::response::Response {
    app.oneshot(
        Request::builder()
            .method(method)
            .uri("/api/contact")
            .header("origin", origin)
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "content-type")
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn cors_echoes_any_origin_with_credentials() {
    let (app, _) = memory_app();
    let response = cors_request(app, "OPTIONS", "https://congregation.example").await;

    let headers = response.headers();
    assert_eq!(headers.get("access-control-allow-origin").unwrap(), "https://congregation.example");
    assert_eq!(headers.get("access-control-allow-credentials").unwrap(), "true");
    assert_eq!(headers.get("access-control-allow-methods").unwrap(), "POST");
    assert_eq!(headers.get("access-control-allow-headers").unwrap(), "content-type");
}

#[tokio::test]
async fn cors_simple_request_carries_credentials() {
    let (app, _) = memory_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/stats")
                .header("origin", "https://other.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(headers.get("access-control-allow-origin").unwrap(), "https://other.example");
    assert_eq!(headers.get("access-control-allow-credentials").unwrap(), "true");
}

#[tokio::test]
async fn cors_restricted_origins_are_enforced() {
    let config = ServerConfig {
        cors_permissive: false,
        allowed_origins: vec!["https://congregation.example".into()],
        ..ServerConfig::default()
    };
    let state = AppState::new(None, CollectionMap::default(), ConfigPresence::default());

    let allowed = cors_request(build_router(state.clone(), &config), "OPTIONS", "https://congregation.example").await;
    assert_eq!(
        allowed.headers().get("access-control-allow-origin").unwrap(),
        "https://congregation.example"
    );

    let denied = cors_request(build_router(state, &config), "OPTIONS", "https://evil.example").await;
    assert!(denied.headers().get("access-control-allow-origin").is_none());
}
