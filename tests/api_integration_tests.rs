//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use storage_cache::{
    api::create_router,
    cache::{current_timestamp, BackendKind, Cache, StorageRegistry},
    storage::{MemoryStorage, StorageBackend},
    AppState, CacheConfig,
};
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> (Arc<MemoryStorage>, Router) {
    let session = Arc::new(MemoryStorage::new("session"));
    let registry = StorageRegistry::new().with(BackendKind::Session, session.clone());
    let config = CacheConfig {
        disabled: false,
        storage_order: vec![BackendKind::Session],
    };
    let state = AppState::new(Cache::new(config, registry));
    (session, create_router(state))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn put_item(body: Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri("/items")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

// == PUT /items ==

#[tokio::test]
async fn test_set_endpoint_success() {
    let (_, app) = create_test_app();

    let response = app
        .oneshot(put_item(json!({"key": "test_key", "value": [1, 2, 3]})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json, json!({"key": "test_key", "stored": true}));
}

#[tokio::test]
async fn test_set_endpoint_writes_wire_format() {
    let (session, app) = create_test_app();

    let response = app
        .oneshot(put_item(json!({"key": "array", "value": [1, 2, 3], "timestamp": 500})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let stored = session.snapshot();
    assert_eq!(stored.len(), 1);
    assert!(stored[0].0.ends_with("array"));
    assert_eq!(stored[0].1, r#"{"timestamp":500,"value":[1,2,3]}"#);
}

#[tokio::test]
async fn test_set_endpoint_empty_key() {
    let (_, app) = create_test_app();

    let response = app
        .oneshot(put_item(json!({"key": "", "value": "v"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("empty"));
}

#[tokio::test]
async fn test_set_endpoint_malformed_json() {
    let (_, app) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/items")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

// == GET /items/:key ==

#[tokio::test]
async fn test_get_endpoint_success() {
    let (_, app) = create_test_app();

    let set_response = app
        .clone()
        .oneshot(put_item(json!({"key": "get_key", "value": {"foo": "barr"}})))
        .await
        .unwrap();
    assert_eq!(set_response.status(), StatusCode::OK);

    let get_response = app.oneshot(get("/items/get_key")).await.unwrap();

    assert_eq!(get_response.status(), StatusCode::OK);
    let json = body_to_json(get_response.into_body()).await;
    assert_eq!(json, json!({"key": "get_key", "cacheHit": true, "value": {"foo": "barr"}}));
}

#[tokio::test]
async fn test_get_endpoint_absent_value_is_a_hit() {
    let (_, app) = create_test_app();

    app.clone()
        .oneshot(put_item(json!({"key": "undefined"})))
        .await
        .unwrap();

    let response = app.oneshot(get("/items/undefined")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json, json!({"key": "undefined", "cacheHit": true}));
}

#[tokio::test]
async fn test_get_endpoint_not_found() {
    let (_, app) = create_test_app();

    let response = app.oneshot(get("/items/nonexistent_key")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_endpoint_max_age() {
    let (session, app) = create_test_app();
    let ten_seconds_ago = current_timestamp() - 10;

    app.clone()
        .oneshot(put_item(json!({"key": "old", "value": "something", "timestamp": ten_seconds_ago})))
        .await
        .unwrap();

    let stale = app.clone().oneshot(get("/items/old?max_age=5")).await.unwrap();
    assert_eq!(stale.status(), StatusCode::NOT_FOUND);

    // The stale entry is not evicted by the read
    assert_eq!(session.len().unwrap(), 1);

    let fresh = app.oneshot(get("/items/old?max_age=100")).await.unwrap();
    assert_eq!(fresh.status(), StatusCode::OK);
}

// == DELETE /items/:key ==

#[tokio::test]
async fn test_delete_endpoint_success() {
    let (_, app) = create_test_app();

    app.clone()
        .oneshot(put_item(json!({"key": "delete_key", "value": "delete_value"})))
        .await
        .unwrap();

    let del_response = app.clone().oneshot(delete("/items/delete_key")).await.unwrap();
    assert_eq!(del_response.status(), StatusCode::OK);
    let json = body_to_json(del_response.into_body()).await;
    assert_eq!(json, json!({"key": "delete_key", "deleted": true}));

    let get_response = app.oneshot(get("/items/delete_key")).await.unwrap();
    assert_eq!(get_response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_endpoint_missing_key_succeeds() {
    let (_, app) = create_test_app();

    let response = app.oneshot(delete("/items/nonexistent_key")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

// == GET /keys and DELETE /items ==

#[tokio::test]
async fn test_keys_and_clear_leave_foreign_entries() {
    let (session, app) = create_test_app();
    session.set_item("whatever", "cool").unwrap();

    for key in ["key1", "key2"] {
        app.clone()
            .oneshot(put_item(json!({"key": key, "value": "data"})))
            .await
            .unwrap();
    }

    let keys = app.clone().oneshot(get("/keys")).await.unwrap();
    let json = body_to_json(keys.into_body()).await;
    assert_eq!(json, json!({"count": 2, "keys": ["key1", "key2"]}));

    let cleared = app.clone().oneshot(delete("/items")).await.unwrap();
    assert_eq!(cleared.status(), StatusCode::OK);

    let keys = app.oneshot(get("/keys")).await.unwrap();
    let json = body_to_json(keys.into_body()).await;
    assert_eq!(json["count"], 0);
    assert_eq!(session.snapshot(), vec![("whatever".to_string(), "cool".to_string())]);
}

// == Unavailable storage ==

#[tokio::test]
async fn test_switched_off_storage_returns_unavailable() {
    let (session, app) = create_test_app();
    session.set_available(false);

    let set = app
        .clone()
        .oneshot(put_item(json!({"key": "k", "value": 1})))
        .await
        .unwrap();
    assert_eq!(set.status(), StatusCode::SERVICE_UNAVAILABLE);

    let get_response = app.clone().oneshot(get("/items/k")).await.unwrap();
    assert_eq!(get_response.status(), StatusCode::NOT_FOUND);

    let clear = app.clone().oneshot(delete("/items")).await.unwrap();
    assert_eq!(clear.status(), StatusCode::SERVICE_UNAVAILABLE);

    let stats = app.oneshot(get("/stats")).await.unwrap();
    let json = body_to_json(stats.into_body()).await;
    assert_eq!(json["backend"], Value::Null);
    assert_eq!(json["failed_writes"], 1);
}

// == GET /stats ==

#[tokio::test]
async fn test_stats_endpoint() {
    let (_, app) = create_test_app();

    app.clone()
        .oneshot(put_item(json!({"key": "k", "value": 1})))
        .await
        .unwrap();
    app.clone().oneshot(get("/items/k")).await.unwrap();
    app.clone().oneshot(get("/items/missing")).await.unwrap();

    let response = app.oneshot(get("/stats")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["hits"], 1);
    assert_eq!(json["misses"], 1);
    assert_eq!(json["writes"], 1);
    assert_eq!(json["hit_rate"], 0.5);
    assert_eq!(json["backend"], "session");
}

// == GET /health ==

#[tokio::test]
async fn test_health_endpoint() {
    let (_, app) = create_test_app();

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}
