// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cache for the Artsy xapp token.
//!
//! One token serves every request. A miss (or expiry) takes the refresh lock
//! so concurrent callers wait for a single credential exchange instead of
//! each issuing their own.

use crate::error::UpstreamError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};

/// Tokens are treated as expired this long before upstream says so.
const EXPIRY_SKEW_SECS: i64 = 60;

/// Lifetime assumed when the token response carries no expiry at all.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 60 * 60;

/// Cached xapp token with expiry information.
#[derive(Clone, Debug)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
}

/// Token endpoint response.
///
/// Artsy documents `expires_at`; some deployments answer with a relative
/// `expires_in` instead. Either is accepted.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: Option<String>,
    expires_in: Option<i64>,
    expires_at: Option<String>,
}

impl TokenResponse {
    fn expiry(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let skew = Duration::seconds(EXPIRY_SKEW_SECS);

        if let Some(expires_in) = self.expires_in {
            return now + Duration::seconds(expires_in) - skew;
        }

        if let Some(at) = self
            .expires_at
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        {
            return at.with_timezone(&Utc) - skew;
        }

        now + Duration::seconds(DEFAULT_TOKEN_LIFETIME_SECS) - skew
    }
}

/// Process-wide xapp token cache.
pub struct TokenCache {
    http: reqwest::Client,
    auth_url: String,
    client_id: String,
    client_secret: String,
    slot: RwLock<Option<CachedToken>>,
    refresh_lock: Mutex<()>,
}

impl TokenCache {
    pub fn new(
        http: reqwest::Client,
        auth_url: String,
        client_id: String,
        client_secret: String,
    ) -> Self {
        Self {
            http,
            auth_url,
            client_id,
            client_secret,
            slot: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Return a token valid right now, exchanging credentials if needed.
    pub async fn get_token(&self) -> Result<String, UpstreamError> {
        if let Some(token) = self.cached().await {
            return Ok(token);
        }

        let _guard = self.refresh_lock.lock().await;

        // Another task may have refreshed while we were waiting.
        if let Some(token) = self.cached().await {
            return Ok(token);
        }

        let fresh = self.exchange().await?;
        let token = fresh.token.clone();
        *self.slot.write().await = Some(fresh);
        Ok(token)
    }

    /// Drop the cached token so the next call performs an exchange.
    pub async fn invalidate(&self) {
        *self.slot.write().await = None;
    }

    async fn cached(&self) -> Option<String> {
        let now = Utc::now();
        self.slot
            .read()
            .await
            .as_ref()
            .filter(|cached| now < cached.expires_at)
            .map(|cached| cached.token.clone())
    }

    async fn exchange(&self) -> Result<CachedToken, UpstreamError> {
        let now = Utc::now();
        tracing::debug!(auth_url = %self.auth_url, "Exchanging client credentials for xapp token");

        let response = self
            .http
            .post(&self.auth_url)
            .json(&TokenRequest {
                client_id: &self.client_id,
                client_secret: &self.client_secret,
            })
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Artsy token request failed");
                UpstreamError::from(e)
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status, body = %body, "Artsy token exchange rejected");
            return Err(UpstreamError::Status { status, body });
        }

        let parsed: TokenResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))?;

        let expires_at = parsed.expiry(now);
        let token = parsed
            .token
            .filter(|t| !t.is_empty())
            .ok_or(UpstreamError::MissingToken)?;

        tracing::info!(expires_at = %expires_at, "Artsy xapp token refreshed");

        Ok(CachedToken { token, expires_at })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(expires_in: Option<i64>, expires_at: Option<&str>) -> TokenResponse {
        TokenResponse {
            token: Some("tok".to_string()),
            expires_in,
            expires_at: expires_at.map(str::to_string),
        }
    }

    #[test]
    fn expiry_from_expires_in_applies_skew() {
        let now = Utc::now();
        let expiry = response(Some(3600), None).expiry(now);
        assert_eq!(expiry, now + Duration::seconds(3540));
    }

    #[test]
    fn expiry_from_expires_at_applies_skew() {
        let now = Utc::now();
        let expiry = response(None, Some("2030-01-01T00:00:00Z")).expiry(now);
        assert_eq!(expiry.to_rfc3339(), "2029-12-31T23:59:00+00:00");
    }

    #[test]
    fn expiry_prefers_expires_in() {
        let now = Utc::now();
        let expiry = response(Some(120), Some("2030-01-01T00:00:00Z")).expiry(now);
        assert_eq!(expiry, now + Duration::seconds(60));
    }

    #[test]
    fn expiry_without_hints_uses_default_lifetime() {
        let now = Utc::now();
        let expiry = response(None, Some("not a date")).expiry(now);
        assert_eq!(expiry, now + Duration::seconds(3540));
    }
}
