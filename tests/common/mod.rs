// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use artsy_gateway::config::Config;
use artsy_gateway::db::{FirestoreUserStore, MemoryUserStore};
use artsy_gateway::routes::create_router;
use artsy_gateway::services::ArtsyService;
use artsy_gateway::AppState;
use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a Firestore store against the emulator.
#[allow(dead_code)]
pub async fn test_firestore() -> FirestoreUserStore {
    FirestoreUserStore::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Build the router and state from a config, over the in-memory store.
#[allow(dead_code)]
pub fn create_test_app_with_config(config: Config) -> (axum::Router, Arc<AppState>) {
    let artsy = ArtsyService::from_config(&config).expect("Failed to build Artsy client");

    let state = Arc::new(AppState {
        config,
        users: Arc::new(MemoryUserStore::new()),
        artsy,
    });

    (create_router(state.clone()), state)
}

/// Create a test app whose Artsy URLs point at an unreachable address.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_config(Config::test_default())
}

/// Create a test app whose Artsy URLs point at `base` (a mock server).
#[allow(dead_code)]
pub fn create_test_app_with_artsy(base: &str) -> (axum::Router, Arc<AppState>) {
    create_test_app_with_config(Config::test_default().with_artsy_base(base))
}

/// Mount a token endpoint returning `token`, valid for an hour.
#[allow(dead_code)]
pub async fn mount_token(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/api/tokens/xapp_token"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "type": "xapp_token",
            "token": token,
            "expires_in": 3600
        })))
        .mount(server)
        .await;
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// JSON request with an optional cookie header.
#[allow(dead_code)]
pub fn json_request(
    method: &str,
    uri: &str,
    body: serde_json::Value,
    cookie: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Body-less request with an optional cookie header.
#[allow(dead_code)]
pub fn empty_request(method: &str, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// `jwt=<value>` pair from the response's session cookie, for replaying.
#[allow(dead_code)]
pub fn session_cookie_pair(response: &Response) -> String {
    let set_cookie = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .find(|v| v.starts_with("jwt="))
        .expect("missing jwt Set-Cookie header");

    set_cookie.split(';').next().unwrap().to_string()
}

/// Register a user through the API and return its id and cookie pair.
#[allow(dead_code)]
pub async fn register(app: &axum::Router, username: &str, email: &str) -> (String, String) {
    use tower::ServiceExt;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/register",
            serde_json::json!({ "username": username, "email": email, "password": "secret" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);

    let cookie = session_cookie_pair(&response);
    let body = body_json(response).await;
    (body["userId"].as_str().unwrap().to_string(), cookie)
}
