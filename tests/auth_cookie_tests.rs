// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session cookie attribute tests.
//!
//! Removal cookies on logout and account deletion must carry the same
//! attributes as the cookie set at login, or browsers keep the old one.

use artsy_gateway::config::Config;
use axum::{
    http::{header, StatusCode},
    response::Response,
};
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::{empty_request, json_request};

fn jwt_set_cookie(response: &Response) -> String {
    let headers: Vec<String> = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect();

    headers
        .iter()
        .find(|value| value.starts_with("jwt="))
        .cloned()
        .unwrap_or_else(|| panic!("missing Set-Cookie header for jwt: {headers:?}"))
}

#[tokio::test]
async fn test_login_cookie_attributes_development() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/register",
            json!({ "username": "ann", "email": "a@x.com", "password": "p" }),
            None,
        ))
        .await
        .unwrap();

    let cookie = jwt_set_cookie(&response);
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("SameSite=None"));
    assert!(cookie.contains("Max-Age=3600"));
    assert!(!cookie.contains("Secure"));
}

#[tokio::test]
async fn test_login_cookie_attributes_production() {
    let config = Config {
        production: true,
        ..Config::test_default()
    };
    let (app, _) = common::create_test_app_with_config(config);

    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/register",
            json!({ "username": "ann", "email": "a@x.com", "password": "p" }),
            None,
        ))
        .await
        .unwrap();

    let cookie = jwt_set_cookie(&response);
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=None"));
    assert!(cookie.contains("Secure"));
}

#[tokio::test]
async fn test_logout_cookie_removal_attributes() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(empty_request("POST", "/auth/logout", Some("jwt=stale")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let cookie = jwt_set_cookie(&response);
    assert!(cookie.starts_with("jwt=;"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=None"));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_logout_without_session_still_succeeds() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(empty_request("POST", "/auth/logout", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["success"], true);
}
