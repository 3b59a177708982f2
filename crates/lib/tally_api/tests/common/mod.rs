//! Shared helpers for router-level tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use tally_api::config::ApiConfig;
use tally_api::{AppState, router};
use tally_core::auth::identity::{DisabledIdentityVerifier, IdentityVerifier};

pub const SECRET: &str = "integration-test-secret";

/// In-memory state with federated login disabled.
pub fn state() -> AppState {
    state_with(ApiConfig::for_tests(SECRET), Arc::new(DisabledIdentityVerifier))
}

pub fn state_with(config: ApiConfig, identity: Arc<dyn IdentityVerifier>) -> AppState {
    AppState::in_memory(config, identity)
}

pub fn app(state: &AppState) -> Router {
    router(state.clone())
}

/// Response parts worth asserting on.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub json: Value,
}

pub async fn send(app: &Router, req: Request<Body>) -> TestResponse {
    let resp = app.clone().oneshot(req).await.expect("request");
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    TestResponse {
        status,
        headers,
        json,
    }
}

pub fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("x-access-token", token);
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header("x-access-token", token);
    }
    builder.body(Body::empty()).expect("request")
}

/// Sign up and return `(id, accessToken)`.
pub async fn sign_up(app: &Router, email: &str, password: &str) -> (String, String) {
    let resp = send(
        app,
        json_request(
            Method::POST,
            "/signup",
            None,
            serde_json::json!({ "email": email, "password": password }),
        ),
    )
    .await;
    assert_eq!(resp.status, StatusCode::OK, "sign-up failed: {}", resp.json);
    (
        resp.json["id"].as_str().expect("id").to_string(),
        resp.json["accessToken"]
            .as_str()
            .expect("accessToken")
            .to_string(),
    )
}
