// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Public Artsy proxy routes.
//!
//! Each handler maps any upstream failure to a 500 with a fixed message;
//! details only go to the log.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{ArtistDetail, ArtistSummary, Artwork, Category};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/search_artist", get(search_artist))
        .route("/api/artist/{id}", get(artist_details))
        .route("/api/similar_artists/{id}", get(similar_artists))
        .route("/api/artworks/{id}", get(artworks))
        .route("/api/categories/{artwork_id}", get(categories))
}

#[derive(Deserialize)]
pub struct SearchParams {
    name: Option<String>,
}

async fn search_artist(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<ArtistSummary>>> {
    let name = params
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Missing 'name' parameter.".to_string()))?;

    let artists = state
        .artsy
        .search_artists(&name)
        .await
        .map_err(AppError::upstream("Failed to search for artists."))?;

    Ok(Json(artists))
}

async fn artist_details(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ArtistDetail>> {
    let artist = state
        .artsy
        .artist(&id)
        .await
        .map_err(AppError::upstream("Failed to fetch artist details."))?;

    Ok(Json(artist))
}

async fn similar_artists(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ArtistSummary>>> {
    let artists = state
        .artsy
        .similar_artists(&id)
        .await
        .map_err(AppError::upstream("Failed to fetch similar artists."))?;

    Ok(Json(artists))
}

async fn artworks(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Artwork>>> {
    let artworks = state
        .artsy
        .artworks(&id)
        .await
        .map_err(AppError::upstream("Failed to fetch artworks."))?;

    Ok(Json(artworks))
}

async fn categories(
    State(state): State<Arc<AppState>>,
    Path(artwork_id): Path<String>,
) -> Result<Json<Vec<Category>>> {
    let categories = state
        .artsy
        .categories(&artwork_id)
        .await
        .map_err(AppError::upstream("Failed to fetch categories."))?;

    Ok(Json(categories))
}
