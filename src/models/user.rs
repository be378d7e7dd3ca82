// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Avatar edge length requested from Gravatar.
const AVATAR_SIZE: u32 = 200;

/// User account stored in the user store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Random UUID (also used as document ID)
    pub id: String,
    pub username: String,
    /// Trimmed, lowercased; unique across users
    pub email: String,
    /// bcrypt hash
    pub password_hash: String,
    #[serde(default)]
    pub favorite_artists: Vec<FavoriteEntry>,
    pub avatar_url: String,
    pub created_at: DateTime<Utc>,
}

/// A user's bookmark of an artist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteEntry {
    pub artist_id: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub added_date: DateTime<Utc>,
}

impl User {
    /// Build a new user with a fresh ID and derived avatar.
    pub fn new(username: String, email: &str, password_hash: String) -> Self {
        let email = normalize_email(email);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            username,
            avatar_url: avatar_url(&email),
            email,
            password_hash,
            favorite_artists: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Change the email and recompute the avatar.
    pub fn set_email(&mut self, email: &str) {
        self.email = normalize_email(email);
        self.avatar_url = avatar_url(&self.email);
    }

    /// Add an artist unless already present. Returns `true` if inserted.
    ///
    /// An existing entry keeps its original `added_date`.
    pub fn add_favorite(&mut self, artist_id: &str, added_date: DateTime<Utc>) -> bool {
        if self.has_favorite(artist_id) {
            return false;
        }
        self.favorite_artists.push(FavoriteEntry {
            artist_id: artist_id.to_string(),
            added_date,
        });
        true
    }

    /// Remove an artist if present. Returns `true` if something was removed.
    pub fn remove_favorite(&mut self, artist_id: &str) -> bool {
        let before = self.favorite_artists.len();
        self.favorite_artists.retain(|f| f.artist_id != artist_id);
        self.favorite_artists.len() != before
    }

    pub fn has_favorite(&self, artist_id: &str) -> bool {
        self.favorite_artists.iter().any(|f| f.artist_id == artist_id)
    }
}

/// Canonical form used for uniqueness and avatar hashing.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Gravatar URL for an email (identicon fallback).
pub fn avatar_url(email: &str) -> String {
    let hash = hex::encode(Sha256::digest(normalize_email(email).as_bytes()));
    format!("https://www.gravatar.com/avatar/{hash}?s={AVATAR_SIZE}&d=identicon")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new("ann".to_string(), "a@x.com", "hash".to_string())
    }

    #[test]
    fn test_add_favorite_is_idempotent() {
        let mut user = user();
        let first = Utc::now();

        assert!(user.add_favorite("andy-warhol", first));
        assert!(!user.add_favorite("andy-warhol", first + chrono::Duration::minutes(5)));

        assert_eq!(user.favorite_artists.len(), 1);
        assert_eq!(user.favorite_artists[0].added_date, first);
    }

    #[test]
    fn test_remove_missing_favorite_is_noop() {
        let mut user = user();
        user.add_favorite("andy-warhol", Utc::now());

        assert!(!user.remove_favorite("frida-kahlo"));
        assert_eq!(user.favorite_artists.len(), 1);

        assert!(user.remove_favorite("andy-warhol"));
        assert!(user.favorite_artists.is_empty());
    }

    #[test]
    fn test_avatar_url_ignores_case_and_whitespace() {
        let a = avatar_url("  Ann@Example.COM ");
        let b = avatar_url("ann@example.com");
        assert_eq!(a, b);
        assert!(a.starts_with("https://www.gravatar.com/avatar/"));
        assert!(a.ends_with("?s=200&d=identicon"));
        // sha256 hex digest
        let hash = a
            .trim_start_matches("https://www.gravatar.com/avatar/")
            .split('?')
            .next()
            .unwrap();
        assert_eq!(hash.len(), 64);
    }

    #[test]
    fn test_set_email_updates_avatar() {
        let mut user = user();
        let old_avatar = user.avatar_url.clone();

        user.set_email(" B@X.com");

        assert_eq!(user.email, "b@x.com");
        assert_ne!(user.avatar_url, old_avatar);
        assert_eq!(user.avatar_url, avatar_url("b@x.com"));
    }

    #[test]
    fn test_favorite_entry_json_shape() {
        let entry = FavoriteEntry {
            artist_id: "andy-warhol".to_string(),
            added_date: Utc::now(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["artistId"], "andy-warhol");
        assert!(json["addedDate"].is_string());
    }
}
