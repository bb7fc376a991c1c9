#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use folio_core::memory::MemoryStore;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use folio_api::config::ServerConfig;
use folio_api::router::build_app_router;
use folio_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        db_max_connections: 5,
        not_found_page_types: vec!["FileNotFoundPage".to_string()],
        virtual_page_types: vec!["LayoutPage".to_string()],
        clean_urls: true,
    }
}

/// Build the full application router over an in-memory page store.
///
/// Uses the same [`build_app_router`] as `main.rs`, so the middleware stack
/// under test is the production one.
pub fn build_test_app() -> Router {
    let config = test_config();
    let state = AppState::new(MemoryStore::new(), config.clone());
    build_app_router(state, &config)
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn send_json(app: Router, method: Method, uri: &str, body: Value) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST a page and return the `data` of the 201 response.
pub async fn create_page(app: &Router, body: Value) -> Value {
    let response = send_json(app.clone(), Method::POST, "/api/v1/pages", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

/// Seed `/` (published) with a published `/about/` child; returns their ids.
pub async fn seed_home_and_about(app: &Router) -> (i64, i64) {
    let home = create_page(
        app,
        serde_json::json!({
            "title": "Home",
            "slug": "/",
            "status": "published",
            "parts": [{ "name": "body", "content": "Welcome" }],
        }),
    )
    .await;
    let home_id = home["page"]["id"].as_i64().unwrap();

    let about = create_page(
        app,
        serde_json::json!({
            "parent_id": home_id,
            "title": "About",
            "slug": "about",
            "status": "published",
            "parts": [{ "name": "body", "content": "About us" }],
        }),
    )
    .await;
    (home_id, about["page"]["id"].as_i64().unwrap())
}
