// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User persistence.
//!
//! Two backends implement [`UserStore`]: Firestore for deployments and an
//! in-process map for local development and tests.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreUserStore;
pub use memory::MemoryUserStore;

use crate::config::DatabaseBackend;
use crate::error::AppError;
use crate::models::user::normalize_email;
use crate::models::{FavoriteEntry, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// Normalized email -> owning user ID; one document per address.
    pub const USER_EMAILS: &str = "user_emails";
}

/// Message returned when an email is already registered.
pub const DUPLICATE_EMAIL: &str = "User with this email already exists.";

/// Profile fields to overwrite; `None` keeps the stored value.
///
/// Favorites are never part of an update, so a concurrent favorite edit
/// cannot be lost to a profile change.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

impl ProfileUpdate {
    /// Apply to a user in place. Returns the previous email if it changed.
    pub fn apply(&self, user: &mut User) -> Option<String> {
        if let Some(username) = &self.username {
            user.username = username.clone();
        }
        if let Some(hash) = &self.password_hash {
            user.password_hash = hash.clone();
        }

        let new_email = self.email.as_deref().map(normalize_email)?;
        if new_email == user.email {
            return None;
        }
        let old_email = std::mem::take(&mut user.email);
        user.set_email(&new_email);
        Some(old_email)
    }
}

/// Storage operations on user documents.
///
/// Favorites methods return `Ok(None)` when the user does not exist, and the
/// full list after the change otherwise.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. Fails with `Conflict` if the email is taken.
    async fn create_user(&self, user: &User) -> Result<(), AppError>;

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError>;

    /// Look up by (normalized) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Atomically apply profile changes and return the updated user.
    ///
    /// `Ok(None)` if the user does not exist; `Conflict` if the new email
    /// belongs to someone else.
    async fn update_profile(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, AppError>;

    /// Returns `true` if a document was removed. Frees the user's email.
    async fn delete_user(&self, user_id: &str) -> Result<bool, AppError>;

    async fn add_favorite(
        &self,
        user_id: &str,
        artist_id: &str,
        added_date: DateTime<Utc>,
    ) -> Result<Option<Vec<FavoriteEntry>>, AppError>;

    async fn remove_favorite(
        &self,
        user_id: &str,
        artist_id: &str,
    ) -> Result<Option<Vec<FavoriteEntry>>, AppError>;
}

/// Open the configured backend.
pub async fn connect(backend: &DatabaseBackend) -> Result<Arc<dyn UserStore>, AppError> {
    match backend {
        DatabaseBackend::Memory => {
            tracing::warn!("Using in-memory user store; accounts are lost on restart");
            Ok(Arc::new(MemoryUserStore::new()))
        }
        DatabaseBackend::Firestore { project_id } => {
            Ok(Arc::new(FirestoreUserStore::new(project_id).await?))
        }
    }
}
