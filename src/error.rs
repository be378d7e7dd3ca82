// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Failure talking to the Artsy API.
///
/// Kept separate from [`AppError`] so the proxy layer can decide about
/// retries and token invalidation before anything reaches a client.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream request timed out")]
    Timeout,

    #[error("upstream transport error: {0}")]
    Transport(String),

    #[error("upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("upstream response could not be decoded: {0}")]
    Decode(String),

    #[error("upstream token response did not contain a token")]
    MissingToken,
}

impl UpstreamError {
    /// Whether another attempt may succeed (timeouts, connection errors,
    /// rate limiting and server-side failures).
    pub fn is_transient(&self) -> bool {
        match self {
            UpstreamError::Timeout | UpstreamError::Transport(_) => true,
            UpstreamError::Status { status, .. } => *status == 429 || *status >= 500,
            UpstreamError::Decode(_) | UpstreamError::MissingToken => false,
        }
    }

    /// Whether upstream rejected the xapp token itself.
    pub fn is_token_rejected(&self) -> bool {
        matches!(self, UpstreamError::Status { status: 401, .. })
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            UpstreamError::Timeout
        } else if e.is_decode() {
            UpstreamError::Decode(e.to_string())
        } else {
            UpstreamError::Transport(e.to_string())
        }
    }
}

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("{context}: {source}")]
    Upstream {
        context: &'static str,
        #[source]
        source: UpstreamError,
    },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Wrap an upstream failure with the generic message shown to clients.
    ///
    /// Intended for `map_err`: `.map_err(AppError::upstream("Failed to fetch artworks."))`.
    pub fn upstream(context: &'static str) -> impl FnOnce(UpstreamError) -> AppError {
        move |source| AppError::Upstream { context, source }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone()),
            AppError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                "token_expired",
                "Token expired".to_string(),
            ),
            AppError::InvalidToken => (
                StatusCode::FORBIDDEN,
                "invalid_token",
                "Invalid token".to_string(),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::BAD_REQUEST, "conflict", msg.clone()),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", msg.clone())
            }
            AppError::Upstream { context, source } => {
                tracing::error!(error = %source, context = %context, "Artsy API error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "upstream_error",
                    context.to_string(),
                )
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "Server error".to_string(),
                )
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Server error".to_string(),
                )
            }
        };

        let body = ErrorResponse {
            success: false,
            error,
            message,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
