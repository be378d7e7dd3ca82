// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Artsy API client for artist search, details and related collections.
//!
//! Handles:
//! - xapp token header on every call (via [`TokenCache`])
//! - Per-call timeout and bounded retry with backoff for transient failures
//! - One repeat with a fresh token when upstream rejects the cached one
//! - Reshaping upstream payloads into the frontend's JSON contract

use crate::config::Config;
use crate::error::UpstreamError;
use crate::models::artsy::{
    self, ArtistList, ArtworkList, Embedded, GeneList, RawArtist, SearchResults,
};
use crate::models::{ArtistDetail, ArtistSummary, Artwork, Category};
use crate::services::token_cache::TokenCache;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// Header carrying the xapp token.
const XAPP_TOKEN_HEADER: &str = "X-Xapp-Token";

/// Page size requested from search and artworks endpoints.
const PAGE_SIZE: &str = "10";

/// Upper bound on a single retry delay.
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// `base * 2^attempt`, capped at [`MAX_RETRY_DELAY`].
fn retry_delay(base: Duration, attempt: u32) -> Duration {
    base.checked_mul(2u32.saturating_pow(attempt))
        .map_or(MAX_RETRY_DELAY, |d| d.min(MAX_RETRY_DELAY))
}

/// Low-level Artsy HTTP client.
#[derive(Clone)]
pub struct ArtsyClient {
    http: reqwest::Client,
    search_url: String,
    api_url: String,
    max_retries: u32,
    retry_backoff: Duration,
}

impl ArtsyClient {
    pub fn new(http: reqwest::Client, config: &Config) -> Self {
        Self {
            http,
            search_url: config.artsy_search_url.clone(),
            api_url: config.artsy_api_url.trim_end_matches('/').to_string(),
            max_retries: config.upstream_max_retries,
            retry_backoff: config.upstream_retry_backoff,
        }
    }

    /// GET with retries for transient failures.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        token: &str,
    ) -> Result<T, UpstreamError> {
        let mut attempt = 0;
        loop {
            match self.get_json_once(url, query, token).await {
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    let delay = retry_delay(self.retry_backoff, attempt);
                    tracing::warn!(
                        error = %e,
                        url,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "Transient Artsy failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn get_json_once<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        token: &str,
    ) -> Result<T, UpstreamError> {
        let response = self
            .http
            .get(url)
            .header(XAPP_TOKEN_HEADER, token)
            .query(query)
            .send()
            .await?;

        self.check_response_json(response).await
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, UpstreamError> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();

            if status == 429 {
                tracing::warn!("Artsy rate limit hit (429)");
            }

            return Err(UpstreamError::Status { status, body });
        }

        response
            .json()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))
    }

    fn artist_url(&self, artist_id: &str) -> String {
        format!(
            "{}/artists/{}",
            self.api_url,
            urlencoding::encode(artist_id)
        )
    }
}

/// High-level Artsy service: token management plus the five proxy lookups.
#[derive(Clone)]
pub struct ArtsyService {
    client: ArtsyClient,
    tokens: Arc<TokenCache>,
}

impl ArtsyService {
    pub fn new(client: ArtsyClient, tokens: Arc<TokenCache>) -> Self {
        Self { client, tokens }
    }

    /// Build the HTTP client, token cache and service from configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()?;

        let tokens = Arc::new(TokenCache::new(
            http.clone(),
            config.artsy_auth_url.clone(),
            config.artsy_client_id.clone(),
            config.artsy_client_secret.clone(),
        ));

        Ok(Self::new(ArtsyClient::new(http, config), tokens))
    }

    pub fn token_cache(&self) -> &Arc<TokenCache> {
        &self.tokens
    }

    /// Authenticated GET; a 401 drops the cached token and tries once more.
    async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, UpstreamError> {
        let token = self.tokens.get_token().await?;
        match self.client.get_json(url, query, &token).await {
            Err(e) if e.is_token_rejected() => {
                tracing::info!("Artsy rejected xapp token, refreshing");
                self.tokens.invalidate().await;
                let token = self.tokens.get_token().await?;
                self.client.get_json(url, query, &token).await
            }
            result => result,
        }
    }

    /// Search artists by name (case-insensitive, first page only).
    pub async fn search_artists(&self, name: &str) -> Result<Vec<ArtistSummary>, UpstreamError> {
        let q = name.to_lowercase();
        let payload: Embedded<SearchResults> = self
            .get(
                &self.client.search_url,
                &[("q", q.as_str()), ("size", PAGE_SIZE), ("type", "artist")],
            )
            .await?;

        Ok(artsy::map_search_results(
            payload.embedded.unwrap_or_default().results,
        ))
    }

    /// Artist detail.
    pub async fn artist(&self, artist_id: &str) -> Result<ArtistDetail, UpstreamError> {
        let raw: RawArtist = self.get(&self.client.artist_url(artist_id), &[]).await?;
        Ok(artsy::map_artist_detail(raw, artist_id))
    }

    /// Artists similar to the given one.
    pub async fn similar_artists(
        &self,
        artist_id: &str,
    ) -> Result<Vec<ArtistSummary>, UpstreamError> {
        let url = format!("{}/artists", self.client.api_url);
        let payload: Embedded<ArtistList> = self
            .get(&url, &[("similar_to_artist_id", artist_id)])
            .await?;

        Ok(artsy::map_similar_artists(
            payload.embedded.unwrap_or_default().artists,
        ))
    }

    /// First page of an artist's artworks.
    pub async fn artworks(&self, artist_id: &str) -> Result<Vec<Artwork>, UpstreamError> {
        let url = format!("{}/artworks", self.client.api_url);
        let payload: Embedded<ArtworkList> = self
            .get(&url, &[("artist_id", artist_id), ("size", PAGE_SIZE)])
            .await?;

        Ok(artsy::map_artworks(
            payload.embedded.unwrap_or_default().artworks,
        ))
    }

    /// Categories (genes) of an artwork.
    pub async fn categories(&self, artwork_id: &str) -> Result<Vec<Category>, UpstreamError> {
        let url = format!("{}/genes", self.client.api_url);
        let payload: Embedded<GeneList> = self.get(&url, &[("artwork_id", artwork_id)]).await?;

        Ok(artsy::map_categories(
            payload.embedded.unwrap_or_default().genes,
        ))
    }
}
