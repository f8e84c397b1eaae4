#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, HeaderValue, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tokio::task::JoinHandle;
use tower::ServiceExt;

use assetrack_api::config::ServerConfig;
use assetrack_api::router::build_app_router;
use assetrack_api::state::AppState;
use assetrack_events::{EventBus, SideEffectWriter};

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec![HeaderValue::from_static("http://localhost:5173")],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        group_allocation_attempts: 3,
    }
}

/// A router over `pool` plus the side-effect writer feeding the database.
pub struct TestApp {
    pub router: Router,
    pub pool: PgPool,
    pub writer: JoinHandle<()>,
}

impl TestApp {
    /// Close the event bus and wait until every queued side effect is written.
    pub async fn drain(self) -> PgPool {
        drop(self.router);
        self.writer.await.unwrap();
        self.pool
    }
}

/// Build the full application router with all middleware layers, the same
/// way `main.rs` does, and start a side-effect writer on the same pool.
pub fn build_test_app(pool: PgPool) -> TestApp {
    let event_bus = Arc::new(EventBus::default());
    let writer = tokio::spawn(SideEffectWriter::run(pool.clone(), event_bus.subscribe()));
    let state = AppState::new(pool.clone(), test_config(), event_bus);
    TestApp {
        router: build_app_router(state),
        pool,
        writer,
    }
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create an active user through the API and return its id.
pub async fn create_user(app: &Router, name: &str) -> i64 {
    let response = post_json(app, "/api/v1/users", serde_json::json!({ "name": name })).await;
    assert_eq!(response.status(), 201);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Register a laptop through the API and return its id.
pub async fn create_laptop(app: &Router, tag: &str, name: &str) -> i64 {
    let response = post_json(
        app,
        "/api/v1/assets",
        serde_json::json!({
            "tag": tag,
            "name": name,
            "category": "HARDWARE",
            "asset_type": "LAPTOP",
            "cost": 1200.0,
            "useful_life_years": 4,
            "purchase_date": "2024-01-01",
            "warranty_expiry_date": "2026-01-01",
            "vendor_id": null,
        }),
    )
    .await;
    assert_eq!(response.status(), 201);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}
