// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! A `.env` file is honoured for local development.

use std::env;
use std::time::Duration;

const DEFAULT_AUTH_URL: &str = "https://api.artsy.net/api/tokens/xapp_token";
const DEFAULT_SEARCH_URL: &str = "https://api.artsy.net/api/search";
const DEFAULT_API_URL: &str = "https://api.artsy.net/api";
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:4200";

/// Where user documents live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseBackend {
    /// In-process store; contents are lost on restart.
    Memory,
    /// Firestore project (`firestore://<project-id>`).
    Firestore { project_id: String },
}

impl DatabaseBackend {
    /// Parse a `DB_URL` value.
    pub fn parse(url: &str) -> Result<Self, ConfigError> {
        let url = url.trim();
        if url == "memory://" || url == "memory" {
            return Ok(Self::Memory);
        }

        match url.strip_prefix("firestore://") {
            Some(project_id) if !project_id.is_empty() && !project_id.contains('/') => {
                Ok(Self::Firestore {
                    project_id: project_id.to_string(),
                })
            }
            _ => Err(ConfigError::Invalid {
                name: "DB_URL",
                reason: format!("unsupported database URL: {url}"),
            }),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Artsy API ---
    /// Token endpoint for the client-credentials exchange
    pub artsy_auth_url: String,
    /// Search endpoint
    pub artsy_search_url: String,
    /// Base URL for artists/artworks/genes
    pub artsy_api_url: String,
    pub artsy_client_id: String,
    pub artsy_client_secret: String,

    // --- Sessions ---
    /// HS256 key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Production mode marks session cookies `Secure`
    pub production: bool,

    // --- Server ---
    pub database: DatabaseBackend,
    /// Frontend origin allowed by CORS
    pub cors_origin: String,
    pub port: u16,

    // --- Upstream call policy ---
    pub upstream_timeout: Duration,
    pub upstream_max_retries: u32,
    pub upstream_retry_backoff: Duration,
    /// Concurrent artist lookups when enriching favorites
    pub enrich_concurrency: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let environment = env::var("NODE_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_default();

        Ok(Self {
            artsy_auth_url: env::var("AUTH_URL").unwrap_or_else(|_| DEFAULT_AUTH_URL.to_string()),
            artsy_search_url: env::var("SEARCH_URL")
                .unwrap_or_else(|_| DEFAULT_SEARCH_URL.to_string()),
            artsy_api_url: env::var("ARTSY_API_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            artsy_client_id: env::var("ARTSY_CLIENT_ID")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("ARTSY_CLIENT_ID"))?,
            artsy_client_secret: env::var("ARTSY_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("ARTSY_CLIENT_SECRET"))?,

            jwt_signing_key: env::var("JWT_SECRET_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SECRET_KEY"))?
                .into_bytes(),
            production: environment.eq_ignore_ascii_case("production"),

            database: DatabaseBackend::parse(
                &env::var("DB_URL").unwrap_or_else(|_| "memory://".to_string()),
            )?,
            cors_origin: env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| DEFAULT_CORS_ORIGIN.to_string()),
            port: parse_var("PORT", 3000),

            upstream_timeout: Duration::from_secs(parse_var("UPSTREAM_TIMEOUT_SECS", 10)),
            upstream_max_retries: parse_var("UPSTREAM_MAX_RETRIES", 2),
            upstream_retry_backoff: Duration::from_millis(parse_var(
                "UPSTREAM_RETRY_BACKOFF_MS",
                200,
            )),
            enrich_concurrency: parse_var::<usize>("ENRICH_CONCURRENCY", 8).max(1),
        })
    }

    /// Deterministic configuration for tests.
    pub fn test_default() -> Self {
        Self {
            artsy_auth_url: "http://127.0.0.1:9/api/tokens/xapp_token".to_string(),
            artsy_search_url: "http://127.0.0.1:9/api/search".to_string(),
            artsy_api_url: "http://127.0.0.1:9/api".to_string(),
            artsy_client_id: "test_client_id".to_string(),
            artsy_client_secret: "test_client_secret".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            production: false,
            database: DatabaseBackend::Memory,
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
            port: 3000,
            upstream_timeout: Duration::from_secs(2),
            upstream_max_retries: 0,
            upstream_retry_backoff: Duration::from_millis(1),
            enrich_concurrency: 4,
        }
    }

    /// Point every Artsy URL at a single base (e.g. a mock server).
    pub fn with_artsy_base(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.artsy_auth_url = format!("{base}/api/tokens/xapp_token");
        self.artsy_search_url = format!("{base}/api/search");
        self.artsy_api_url = format!("{base}/api");
        self
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(name, value = %raw, "Ignoring unparseable config value");
            default
        }),
        Err(_) => default,
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Set required env vars for test
        env::set_var("ARTSY_CLIENT_ID", "test_id");
        env::set_var("ARTSY_CLIENT_SECRET", " test_secret\n");
        env::set_var("JWT_SECRET_KEY", "test_jwt_key_32_bytes_minimum!!");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.artsy_client_id, "test_id");
        assert_eq!(config.artsy_client_secret, "test_secret");
        assert_eq!(config.jwt_signing_key, b"test_jwt_key_32_bytes_minimum!!");
    }

    #[test]
    fn test_database_backend_parse() {
        assert_eq!(
            DatabaseBackend::parse("memory://").unwrap(),
            DatabaseBackend::Memory
        );
        assert_eq!(
            DatabaseBackend::parse("firestore://artsy-prod").unwrap(),
            DatabaseBackend::Firestore {
                project_id: "artsy-prod".to_string()
            }
        );
        assert!(DatabaseBackend::parse("mongodb://localhost:27017/artsy").is_err());
        assert!(DatabaseBackend::parse("firestore://").is_err());
    }

    #[test]
    fn test_with_artsy_base() {
        let config = Config::test_default().with_artsy_base("http://127.0.0.1:4545/");
        assert_eq!(
            config.artsy_auth_url,
            "http://127.0.0.1:4545/api/tokens/xapp_token"
        );
        assert_eq!(config.artsy_search_url, "http://127.0.0.1:4545/api/search");
        assert_eq!(config.artsy_api_url, "http://127.0.0.1:4545/api");
    }
}
