// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account and session routes.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::auth::{
    clear_session_cookie, create_session_token, session_cookie, AuthUser,
};
use crate::models::User;
use crate::services::ProfileChange;
use crate::AppState;

/// Routes reachable without a session.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

/// Routes that need a session; the auth layer is applied in routes/mod.rs.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/me", get(get_me).patch(update_me))
        .route("/auth/delete-account", delete(delete_account))
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

/// Profile changes; omitted fields are left alone.
#[derive(Deserialize, Default)]
pub struct UpdateProfileRequest {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

/// Response to register, login and profile updates.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub avatar_url: String,
}

impl AuthResponse {
    fn new(message: &str, user: User) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            user_id: user.id,
            username: user.username,
            email: user.email,
            avatar_url: user.avatar_url,
        }
    }
}

/// Current user response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub success: bool,
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub avatar_url: String,
}

/// Plain acknowledgement.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// Issue a session for `user` and attach it to the cookie jar.
fn start_session(state: &AppState, jar: CookieJar, user: &User) -> Result<CookieJar> {
    let token = create_session_token(&user.id, &state.config.jwt_signing_key)?;
    Ok(jar.add(session_cookie(token, state.config.production)))
}

/// Create an account and log it in.
async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>)> {
    let user = state
        .user_service()
        .register(&req.username, &req.email, &req.password)
        .await?;

    let jar = start_session(&state, jar, &user)?;

    Ok((
        StatusCode::CREATED,
        jar,
        Json(AuthResponse::new("User registered successfully", user)),
    ))
}

async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    let user = state
        .user_service()
        .verify_credentials(&req.email, &req.password)
        .await?;

    tracing::info!(user_id = %user.id, "User logged in");
    let jar = start_session(&state, jar, &user)?;

    Ok((jar, Json(AuthResponse::new("Login successful", user))))
}

/// Clear the session cookie. Works with or without a valid session.
async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    (
        jar.add(clear_session_cookie(state.config.production)),
        Json(MessageResponse {
            success: true,
            message: "Logged out successfully".to_string(),
        }),
    )
}

async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<MeResponse>> {
    let user = state
        .user_service()
        .get(&auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(MeResponse {
        success: true,
        user_id: user.id,
        username: user.username,
        email: user.email,
        avatar_url: user.avatar_url,
    }))
}

async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<AuthResponse>> {
    let change = ProfileChange {
        username: req.username,
        email: req.email,
        password: req.password,
    };

    let user = state
        .user_service()
        .change_profile(&auth.user_id, change)
        .await?;

    Ok(Json(AuthResponse::new("Profile updated successfully", user)))
}

/// Delete the account and end the session.
async fn delete_account(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>)> {
    tracing::info!(user_id = %auth.user_id, "User-initiated account deletion");

    state.user_service().delete(&auth.user_id).await?;

    Ok((
        jar.add(clear_session_cookie(state.config.production)),
        Json(MessageResponse {
            success: true,
            message: "Account deleted successfully".to_string(),
        }),
    ))
}
