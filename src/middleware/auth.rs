// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session token (JWT) authentication middleware and cookie helpers.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "jwt";

/// Session lifetime (token `exp` and cookie `Max-Age`).
pub const SESSION_TTL_SECS: i64 = 60 * 60;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User ID
    #[serde(rename = "userId", default)]
    pub user_id: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Authenticated user extracted from JWT.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

/// Why a session token was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    Expired,
    /// Signature fine, but the payload carries no user.
    InvalidFormat,
    Invalid,
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::Expired => AppError::TokenExpired,
            SessionError::InvalidFormat => {
                AppError::Unauthorized("Invalid token format".to_string())
            }
            SessionError::Invalid => AppError::InvalidToken,
        }
    }
}

/// Verify a session token and return its claims.
pub fn verify_session(token: &str, signing_key: &[u8]) -> Result<Claims, SessionError> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => SessionError::Expired,
        _ => SessionError::Invalid,
    })?;

    if token_data.claims.user_id.trim().is_empty() {
        return Err(SessionError::InvalidFormat);
    }

    Ok(token_data.claims)
}

/// Middleware that requires a valid session for an existing user.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Try cookie first, then header
    let token = if let Some(cookie) = jar.get(SESSION_COOKIE) {
        cookie.value().to_string()
    } else {
        let auth_header = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => return Err(AppError::Unauthorized("Unauthorized".to_string())),
        }
    };

    let claims = verify_session(&token, &state.config.jwt_signing_key).map_err(|e| {
        tracing::debug!(reason = ?e, "Rejected session token");
        AppError::from(e)
    })?;

    if state.users.get_user(&claims.user_id).await?.is_none() {
        return Err(AppError::Unauthorized("User no longer exists".to_string()));
    }

    request.extensions_mut().insert(AuthUser {
        user_id: claims.user_id,
    });

    Ok(next.run(request).await)
}

/// Create a JWT for a user session.
pub fn create_session_token(user_id: &str, signing_key: &[u8]) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        user_id: user_id.to_string(),
        iat: now,
        exp: now + SESSION_TTL_SECS as usize,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

/// Session cookie carrying `token`.
///
/// `SameSite=None` lets the separately hosted frontend send it; `Secure`
/// is only set in production so plain-HTTP local development still works.
pub fn session_cookie(token: String, production: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .path("/")
        .same_site(SameSite::None)
        .secure(production)
        .max_age(time::Duration::seconds(SESSION_TTL_SECS))
        .build()
}

/// Cookie that clears the session (same attributes, `Max-Age=0`).
pub fn clear_session_cookie(production: bool) -> Cookie<'static> {
    let mut cookie = session_cookie(String::new(), production);
    cookie.make_removal();
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"test_signing_key_32_bytes_long!!";

    #[test]
    fn test_session_roundtrip() {
        let token = create_session_token("user-1", KEY).unwrap();
        let claims = verify_session(&token, KEY).unwrap();
        assert_eq!(claims.user_id, "user-1");
        assert_eq!(claims.exp - claims.iat, SESSION_TTL_SECS as usize);
    }

    #[test]
    fn test_wrong_key_is_invalid() {
        let token = create_session_token("user-1", KEY).unwrap();
        assert_eq!(
            verify_session(&token, b"another_key_entirely_32_bytes!!!").unwrap_err(),
            SessionError::Invalid
        );
        assert_eq!(
            verify_session("not.a.jwt", KEY).unwrap_err(),
            SessionError::Invalid
        );
    }

    #[test]
    fn test_undecodable_payload_is_invalid() {
        // `e30` is `{}`: well-formed segments, no alg and no claims.
        assert_eq!(
            verify_session("e30.e30.abc", KEY).unwrap_err(),
            SessionError::Invalid
        );
    }

    #[test]
    fn test_signed_token_without_user_is_invalid_format() {
        let now = chrono::Utc::now().timestamp() as usize;
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &serde_json::json!({ "exp": now + 60, "iat": now }),
            &jsonwebtoken::EncodingKey::from_secret(KEY),
        )
        .unwrap();
        assert_eq!(
            verify_session(&token, KEY).unwrap_err(),
            SessionError::InvalidFormat
        );
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc".to_string(), false).to_string();
        assert!(cookie.starts_with("jwt=abc"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=None"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(!cookie.contains("Secure"));

        let secure = session_cookie("abc".to_string(), true).to_string();
        assert!(secure.contains("Secure"));
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let cookie = clear_session_cookie(true).to_string();
        assert!(cookie.starts_with("jwt="));
        assert!(cookie.contains("Max-Age=0"));
        assert!(cookie.contains("Path=/"));
    }
}
