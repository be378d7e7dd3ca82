// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process user store backed by `DashMap`.

use super::{ProfileUpdate, UserStore, DUPLICATE_EMAIL};
use crate::error::AppError;
use crate::models::user::normalize_email;
use crate::models::{FavoriteEntry, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// Users keyed by ID, plus an email -> ID index that enforces uniqueness.
#[derive(Default)]
pub struct MemoryUserStore {
    users: DashMap<String, User>,
    emails: DashMap<String, String>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create_user(&self, user: &User) -> Result<(), AppError> {
        // Claiming the email slot first makes concurrent registrations race
        // on a single entry.
        match self.emails.entry(normalize_email(&user.email)) {
            Entry::Occupied(_) => return Err(AppError::Conflict(DUPLICATE_EMAIL.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(user.id.clone());
            }
        }
        self.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.get(user_id).map(|u| u.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let Some(user_id) = self
            .emails
            .get(&normalize_email(email))
            .map(|id| id.clone())
        else {
            return Ok(None);
        };
        self.get_user(&user_id).await
    }

    async fn update_profile(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, AppError> {
        // Claim the new address before touching the user document.
        let mut claimed = None;
        if let Some(email) = update.email.as_deref().map(normalize_email) {
            match self.emails.entry(email.clone()) {
                Entry::Occupied(owner) if owner.get() != user_id => {
                    return Err(AppError::Conflict(DUPLICATE_EMAIL.to_string()))
                }
                Entry::Occupied(_) => {}
                Entry::Vacant(slot) => {
                    slot.insert(user_id.to_string());
                    claimed = Some(email);
                }
            }
        }

        let Some(mut user) = self.users.get_mut(user_id) else {
            if let Some(email) = claimed {
                self.emails.remove(&email);
            }
            return Ok(None);
        };
        let old_email = update.apply(&mut user);
        let updated = user.clone();
        drop(user);

        if let Some(old_email) = old_email {
            self.emails.remove_if(&old_email, |_, owner| owner == user_id);
        }
        Ok(Some(updated))
    }

    async fn delete_user(&self, user_id: &str) -> Result<bool, AppError> {
        match self.users.remove(user_id) {
            Some((_, user)) => {
                self.emails.remove_if(&user.email, |_, owner| owner == user_id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn add_favorite(
        &self,
        user_id: &str,
        artist_id: &str,
        added_date: DateTime<Utc>,
    ) -> Result<Option<Vec<FavoriteEntry>>, AppError> {
        Ok(self.users.get_mut(user_id).map(|mut user| {
            user.add_favorite(artist_id, added_date);
            user.favorite_artists.clone()
        }))
    }

    async fn remove_favorite(
        &self,
        user_id: &str,
        artist_id: &str,
    ) -> Result<Option<Vec<FavoriteEntry>>, AppError> {
        Ok(self.users.get_mut(user_id).map(|mut user| {
            user.remove_favorite(artist_id);
            user.favorite_artists.clone()
        }))
    }
}
