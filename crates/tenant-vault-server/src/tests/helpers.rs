//! Test fixtures for router tests.

use crate::{config::Config, create_router, state::AppState};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

const KEY_HEX: &str = "2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a";

/// Router over the in-memory backend with minimum-cost hashing
pub async fn create_test_app() -> Router {
    let env: HashMap<&str, &str> = [
        ("TOKEN_SIGNING_KEY", KEY_HEX),
        ("BACKEND", "memory"),
        ("SCOPE_POLL_INTERVAL_MS", "1"),
        ("ARGON2_MEMORY_KIB", "8"),
        ("ARGON2_ITERATIONS", "1"),
        ("ARGON2_PARALLELISM", "1"),
    ]
    .into_iter()
    .collect();

    let config = Config::from_lookup(|key| env.get(key).map(|v| v.to_string())).unwrap();
    let state = AppState::new(config).await.unwrap();
    create_router(Arc::new(state))
}

/// Send a request and decode the JSON body (`Null` when empty)
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let body = body.map(|json| json.to_string());
    send_raw(app, method, uri, token, body.as_deref()).await
}

/// Like [`send`], with the request body given verbatim
pub async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(raw) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(raw.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

/// Register `username` and return a fresh token
pub async fn register_and_login(app: &Router, username: &str, password: &str) -> String {
    let credentials = serde_json::json!({ "username": username, "password": password });

    let (status, _) = send(app, Method::POST, "/register", None, Some(credentials.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(app, Method::POST, "/login", None, Some(credentials)).await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}
