// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP route handlers.

pub mod artsy;
pub mod auth;
pub mod favorites;

use crate::middleware::auth::require_auth;
use crate::AppState;
use axum::http::{header, HeaderValue, Method, Uri};
use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct HealthResponse {
    pub status: String,
    pub build_id: String,
}

/// Health check response
async fn health_check() -> Json<HealthResponse> {
    let build_id = option_env!("BUILD_ID").unwrap_or("unknown").to_string();
    Json(HealthResponse {
        status: "ok".to_string(),
        build_id,
    })
}

/// Whether a browser origin may call the API with credentials.
///
/// Outside production, `http://localhost` and `http://127.0.0.1` on any
/// port are also accepted. The host must match exactly.
pub fn origin_allowed(origin: &str, configured: &str, production: bool) -> bool {
    if origin == configured {
        return true;
    }
    if production {
        return false;
    }

    let Ok(uri) = origin.parse::<Uri>() else {
        return false;
    };
    uri.scheme_str() == Some("http")
        && matches!(uri.host(), Some("localhost") | Some("127.0.0.1"))
        && uri.path() == "/"
        && uri.query().is_none()
}

fn cors_layer(configured_origin: String, production: bool) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _request_parts: &axum::http::request::Parts| {
                origin_allowed(origin.to_str().unwrap_or(""), &configured_origin, production)
            },
        ))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(state.config.cors_origin.clone(), state.config.production);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .merge(auth::public_routes())
        .merge(artsy::routes());

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .merge(auth::protected_routes())
        .merge(favorites::routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(middleware::from_fn(
            crate::middleware::security::add_security_headers,
        ))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_allowed() {
        let configured = "https://art.example.com";
        assert!(origin_allowed("https://art.example.com", configured, false));
        assert!(origin_allowed("http://localhost:4200", configured, false));
        assert!(origin_allowed("http://localhost", configured, false));
        assert!(origin_allowed("http://127.0.0.1:8080", configured, false));
        assert!(!origin_allowed("https://evil.example.com", configured, false));
        assert!(!origin_allowed("https://localhost.evil.com", configured, false));
        assert!(!origin_allowed("http://localhost.evil.com", configured, false));
        assert!(!origin_allowed("http://127.0.0.1.evil.com", configured, false));
        assert!(!origin_allowed("http://localhost@evil.com", configured, false));
        assert!(!origin_allowed("", configured, false));
    }

    #[test]
    fn test_origin_allowed_in_production_is_exact() {
        let configured = "https://art.example.com";
        assert!(origin_allowed("https://art.example.com", configured, true));
        assert!(!origin_allowed("http://localhost:4200", configured, true));
        assert!(!origin_allowed("http://127.0.0.1:8080", configured, true));
    }
}
