// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Partial-failure-tolerant fan-out and favorites enrichment.

use crate::models::{ArtistDetail, FavoriteEntry};
use crate::services::ArtsyService;
use chrono::{DateTime, Utc};
use futures_util::{stream, StreamExt};
use serde::Serialize;
use std::future::Future;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Outcome of a fan-out: what succeeded, and which inputs failed with what.
#[derive(Debug)]
pub struct FanOut<I, T, E> {
    pub successes: Vec<T>,
    pub failures: Vec<(I, E)>,
}

/// Run `f` over every item with at most `concurrency` in flight.
///
/// Each lookup is independent: one failure never cancels the others.
/// Successes come back in completion order.
pub async fn collect_successes<I, T, E, F, Fut>(
    items: Vec<I>,
    concurrency: usize,
    f: F,
) -> FanOut<I, T, E>
where
    I: Clone,
    F: Fn(I) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let results: Vec<(I, Result<T, E>)> = stream::iter(items)
        .map(|item| {
            let fut = f(item.clone());
            async move { (item, fut.await) }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut successes = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for (item, result) in results {
        match result {
            Ok(value) => successes.push(value),
            Err(e) => failures.push((item, e)),
        }
    }

    FanOut {
        successes,
        failures,
    }
}

/// Favorite artist with live data from Artsy.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedFavorite {
    pub id: String,
    pub name: String,
    pub nationality: String,
    pub birthday: String,
    pub thumbnail: Option<String>,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub added_date: DateTime<Utc>,
}

impl EnrichedFavorite {
    fn new(entry: &FavoriteEntry, artist: ArtistDetail) -> Self {
        Self {
            id: entry.artist_id.clone(),
            name: artist.name,
            nationality: artist.nationality,
            birthday: artist.birthday,
            thumbnail: artist.thumbnail,
            added_date: entry.added_date,
        }
    }
}

/// Look up every favorite, dropping the ones Artsy cannot resolve.
///
/// Result is ordered by `added_date`, newest first.
pub async fn enrich_favorites(
    artsy: &ArtsyService,
    favorites: Vec<FavoriteEntry>,
    concurrency: usize,
) -> Vec<EnrichedFavorite> {
    let outcome = collect_successes(favorites, concurrency, |entry| async move {
        artsy
            .artist(&entry.artist_id)
            .await
            .map(|artist| EnrichedFavorite::new(&entry, artist))
    })
    .await;

    for (entry, error) in &outcome.failures {
        tracing::warn!(
            artist_id = %entry.artist_id,
            error = %error,
            "Failed to fetch favorite artist, omitting"
        );
    }

    let mut enriched = outcome.successes;
    enriched.sort_by(|a, b| b.added_date.cmp(&a.added_date));
    enriched
}
