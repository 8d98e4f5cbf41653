#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use classdash_api::auth::identity::{issue_identity_token, IdentityConfig};
use classdash_api::config::ServerConfig;
use classdash_api::router::build_app_router;
use classdash_api::state::AppState;
use classdash_db::store::{MemoryRowStore, RowStore};

pub const TEST_SECRET: &str = "test-identity-secret";

/// Build a test `ServerConfig` with safe defaults and an in-memory store URL.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        storage_url: "memory://".to_string(),
        identity: IdentityConfig {
            secret: TEST_SECRET.to_string(),
        },
    }
}

/// Full application router over the given store.
pub fn build_app_with_store(store: Arc<dyn RowStore>) -> Router {
    build_app_router(AppState::new(store, test_config()))
}

/// Full application router over a fresh in-memory store.
///
/// The returned router is cheap to clone; clones share the store.
pub fn build_test_app() -> Router {
    build_app_with_store(Arc::new(MemoryRowStore::new()))
}

/// A valid identity token for `email`, signed with the test secret.
pub fn token_for(email: &str) -> String {
    let config = IdentityConfig {
        secret: TEST_SECRET.to_string(),
    };
    issue_identity_token(email, 3600, &config).unwrap()
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: &Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: &Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_auth(app: &Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn post(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri, None, None).await
}

pub async fn put_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, None, Some(body)).await
}

pub async fn put_json_auth(
    app: &Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: &Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
