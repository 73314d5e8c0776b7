//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use ttl_lru::{api::create_router, AppState, CacheStore, Dispatcher};

// == Helper Functions ==

fn create_test_app_with(capacity: usize, queue_size: usize) -> Router {
    let (dispatcher, _consumer) =
        Dispatcher::spawn(CacheStore::new(capacity).unwrap(), queue_size).unwrap();
    create_router(AppState::new(dispatcher))
}

fn create_test_app() -> Router {
    create_test_app_with(100, 16)
}

fn put_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri("/put")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(key: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(format!("/get/{key}"))
        .body(Body::empty())
        .unwrap()
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// == PUT Endpoint Tests ==

#[tokio::test]
async fn test_put_endpoint_success() {
    let app = create_test_app();

    let response = app
        .oneshot(put_request(r#"{"key":"test_key","value":"test_value","ttl":"1m"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn test_put_endpoint_invalid_ttl() {
    let app = create_test_app();

    let response = app
        .oneshot(put_request(r#"{"key":"k","value":1,"ttl":"five minutes-ish"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("TTL"));
}

#[tokio::test]
async fn test_put_endpoint_malformed_body() {
    let app = create_test_app();

    let response = app
        .oneshot(put_request(r#"{"invalid json"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_to_json(response.into_body()).await;
    assert!(json.get("error").is_some());
}

#[tokio::test]
async fn test_put_endpoint_without_content_type() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/put")
                .body(Body::from(r#"{"key":"k","value":1,"ttl":"1s"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_put_endpoint_empty_key() {
    let app = create_test_app();

    let response = app
        .oneshot(put_request(r#"{"key":"","value":"test","ttl":"1s"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_put_endpoint_oversized_body() {
    let app = create_test_app();
    let body = format!(
        r#"{{"key":"big","value":"{}","ttl":"1m"}}"#,
        "x".repeat(3 * 1024 * 1024)
    );

    let response = app.oneshot(put_request(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_to_json(response.into_body()).await;
    assert!(json.get("error").is_some());
}

#[tokio::test]
async fn test_put_endpoint_missing_value_stores_null() {
    let app = create_test_app();

    let response = app
        .clone()
        .oneshot(put_request(r#"{"key":"empty","ttl":"1m"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.oneshot(get_request("empty")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response.into_body()).await, Value::Null);
}

// == GET Endpoint Tests ==

#[tokio::test]
async fn test_get_endpoint_returns_json_value() {
    let app = create_test_app();

    let put_response = app
        .clone()
        .oneshot(put_request(
            r#"{"key":"get_key","value":{"name":"widget","tags":["a","b"]},"ttl":"1m"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(put_response.status(), StatusCode::NO_CONTENT);

    let get_response = app.oneshot(get_request("get_key")).await.unwrap();

    assert_eq!(get_response.status(), StatusCode::OK);
    let json = body_to_json(get_response.into_body()).await;
    assert_eq!(json, json!({"name": "widget", "tags": ["a", "b"]}));
}

#[tokio::test]
async fn test_get_endpoint_not_found() {
    let app = create_test_app();

    let response = app.oneshot(get_request("nonexistent_key")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ttl_expiration_via_api() {
    let app = create_test_app();

    let put_response = app
        .clone()
        .oneshot(put_request(
            r#"{"key":"ttl_test","value":"expires_soon","ttl":"50ms"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(put_response.status(), StatusCode::NO_CONTENT);

    let get_response = app.clone().oneshot(get_request("ttl_test")).await.unwrap();
    assert_eq!(get_response.status(), StatusCode::OK);

    tokio::time::sleep(Duration::from_millis(100)).await;

    let get_response = app.oneshot(get_request("ttl_test")).await.unwrap();
    assert_eq!(get_response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_lru_eviction_via_api() {
    let app = create_test_app_with(2, 16);

    for key in ["a", "b"] {
        let body = format!(r#"{{"key":"{key}","value":"{key}","ttl":"1m"}}"#);
        app.clone().oneshot(put_request(&body)).await.unwrap();
    }
    // Touch "a" so "b" becomes the eviction candidate
    app.clone().oneshot(get_request("a")).await.unwrap();
    app.clone()
        .oneshot(put_request(r#"{"key":"c","value":"c","ttl":"1m"}"#))
        .await
        .unwrap();

    let a = app.clone().oneshot(get_request("a")).await.unwrap();
    let b = app.clone().oneshot(get_request("b")).await.unwrap();
    let c = app.oneshot(get_request("c")).await.unwrap();

    assert_eq!(a.status(), StatusCode::OK);
    assert_eq!(b.status(), StatusCode::NOT_FOUND);
    assert_eq!(c.status(), StatusCode::OK);
}

// == DELETE Endpoint Tests ==

#[tokio::test]
async fn test_delete_endpoint_success() {
    let app = create_test_app();

    app.clone()
        .oneshot(put_request(
            r#"{"key":"delete_key","value":"delete_value","ttl":"1m"}"#,
        ))
        .await
        .unwrap();

    let del_response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/del/delete_key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(del_response.status(), StatusCode::OK);
    assert_eq!(body_to_json(del_response.into_body()).await, json!("delete_value"));

    let get_response = app.oneshot(get_request("delete_key")).await.unwrap();
    assert_eq!(get_response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_endpoint_not_found() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/del/nonexistent_key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// == Backpressure Tests ==

#[tokio::test]
async fn test_full_queue_returns_429() {
    // Consumer never runs, so the single queue slot stays occupied
    let (dispatcher, _consumer) = Dispatcher::new(CacheStore::new(10).unwrap(), 1).unwrap();
    let (tx, _rx) = tokio::sync::oneshot::channel();
    dispatcher
        .enqueue(ttl_lru::dispatch::Action::Expunge { respond_to: tx })
        .unwrap();
    let app = create_router(AppState::new(dispatcher));

    let response = app
        .clone()
        .oneshot(put_request(r#"{"key":"k","value":1,"ttl":"1m"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers().get("retry-after").unwrap(), "1");

    // A full queue is not a miss
    let response = app.oneshot(get_request("k")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

// == STATS Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint() {
    let app = create_test_app();

    app.clone()
        .oneshot(put_request(r#"{"key":"stats_key","value":"stats_value","ttl":"1m"}"#))
        .await
        .unwrap();
    app.clone().oneshot(get_request("stats_key")).await.unwrap();
    app.clone().oneshot(get_request("nonexistent")).await.unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/stats")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;

    assert_eq!(json["hits"].as_u64().unwrap(), 1);
    assert_eq!(json["misses"].as_u64().unwrap(), 1);
    assert_eq!(json["total_entries"].as_u64().unwrap(), 1);
    assert_eq!(json["capacity"].as_u64().unwrap(), 100);
    assert_eq!(json["rejected"].as_u64().unwrap(), 0);
    assert_eq!(json["pending"].as_u64().unwrap(), 0);
    assert_eq!(json["queue_capacity"].as_u64().unwrap(), 16);
    assert!(json.get("hit_rate").is_some());
}

// == HEALTH Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"].as_str().unwrap(), "healthy");
    assert!(json.get("timestamp").is_some());
}
