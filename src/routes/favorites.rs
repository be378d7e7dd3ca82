// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Favorite-artist routes for the logged-in user.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{delete, get},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::FavoriteEntry;
use crate::services::{enrich_favorites, EnrichedFavorite};
use crate::AppState;

/// Favorites routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/users/favorites", get(list_favorites).post(add_favorite))
        .route("/api/users/favorites/{artist_id}", delete(remove_favorite))
}

const FAVORITES_FAILED: &str = "Failed to fetch favorites.";

fn user_not_found() -> AppError {
    AppError::NotFound("User not found".to_string())
}

/// Stored favorites list.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct FavoritesResponse {
    pub success: bool,
    pub favorite_artists: Vec<FavoriteEntry>,
}

impl FavoritesResponse {
    fn new(favorite_artists: Vec<FavoriteEntry>) -> Self {
        Self {
            success: true,
            favorite_artists,
        }
    }
}

/// Favorites with live artist data.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct EnrichedFavoritesResponse {
    pub success: bool,
    pub favorites: Vec<EnrichedFavorite>,
}

#[derive(Deserialize, Default)]
pub struct ListQuery {
    #[serde(default)]
    enrich: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFavoriteRequest {
    #[serde(default)]
    artist_id: Option<String>,
}

async fn list_favorites(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> Result<Response> {
    let user = state
        .users
        .get_user(&auth.user_id)
        .await?
        .ok_or_else(user_not_found)?;

    if !query.enrich {
        return Ok(Json(FavoritesResponse::new(user.favorite_artists)).into_response());
    }

    // Per-artist failures are dropped, but without a token every lookup
    // fails and an empty list would look like "no favorites".
    if !user.favorite_artists.is_empty() {
        state
            .artsy
            .token_cache()
            .get_token()
            .await
            .map_err(AppError::upstream(FAVORITES_FAILED))?;
    }

    let favorites = enrich_favorites(
        &state.artsy,
        user.favorite_artists,
        state.config.enrich_concurrency,
    )
    .await;

    Ok(Json(EnrichedFavoritesResponse {
        success: true,
        favorites,
    })
    .into_response())
}

async fn add_favorite(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<AddFavoriteRequest>,
) -> Result<Json<FavoritesResponse>> {
    let artist_id = req
        .artist_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::Validation("Artist ID is required".to_string()))?;

    let favorites = state
        .users
        .add_favorite(&auth.user_id, &artist_id, chrono::Utc::now())
        .await?
        .ok_or_else(user_not_found)?;

    tracing::debug!(user_id = %auth.user_id, artist_id = %artist_id, "Favorite added");
    Ok(Json(FavoritesResponse::new(favorites)))
}

async fn remove_favorite(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(artist_id): Path<String>,
) -> Result<Json<FavoritesResponse>> {
    let favorites = state
        .users
        .remove_favorite(&auth.user_id, &artist_id)
        .await?
        .ok_or_else(user_not_found)?;

    tracing::debug!(user_id = %auth.user_id, artist_id = %artist_id, "Favorite removed");
    Ok(Json(FavoritesResponse::new(favorites)))
}
