// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account operations: registration, credential checks, profile changes.

use crate::db::{ProfileUpdate, UserStore};
use crate::error::AppError;
use crate::models::User;
use std::sync::Arc;

/// bcrypt work factor for stored password hashes.
const BCRYPT_COST: u32 = 10;

/// Shown for both unknown email and wrong password.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Requested profile changes; `None` leaves a field alone.
#[derive(Debug, Default, Clone)]
pub struct ProfileChange {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// User account service over a [`UserStore`].
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Create an account. Fails with `Conflict` if the email is registered.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AppError> {
        if username.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            return Err(AppError::Validation("All fields are required".to_string()));
        }

        // Cheap pre-check so duplicates skip the bcrypt work; the store
        // still enforces uniqueness on insert.
        if self.store.find_by_email(email).await?.is_some() {
            return Err(AppError::Conflict(crate::db::DUPLICATE_EMAIL.to_string()));
        }

        let password_hash = hash_password(password).await?;
        let user = User::new(username.trim().to_string(), email, password_hash);
        self.store.create_user(&user).await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Check an email/password pair.
    ///
    /// Unknown email and wrong password produce the same error; only the
    /// log line tells them apart.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<User, AppError> {
        let Some(user) = self.store.find_by_email(email).await? else {
            tracing::info!("Login attempt for unknown email");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        if !verify_password(password, &user.password_hash).await? {
            tracing::info!(user_id = %user.id, "Login attempt with wrong password");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        Ok(user)
    }

    pub async fn get(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.store.get_user(user_id).await
    }

    /// Apply username/email/password changes.
    ///
    /// The password is hashed before the store is touched, and the store
    /// applies only the changed fields.
    pub async fn change_profile(
        &self,
        user_id: &str,
        change: ProfileChange,
    ) -> Result<User, AppError> {
        let username = match change.username {
            Some(username) if username.trim().is_empty() => {
                return Err(AppError::Validation("Username must not be empty".to_string()))
            }
            other => other.map(|u| u.trim().to_string()),
        };

        if change.email.as_deref().is_some_and(|e| e.trim().is_empty()) {
            return Err(AppError::Validation("Email must not be empty".to_string()));
        }

        let password_hash = match change.password {
            Some(password) if password.is_empty() => {
                return Err(AppError::Validation("Password must not be empty".to_string()))
            }
            Some(password) => Some(hash_password(&password).await?),
            None => None,
        };

        let update = ProfileUpdate {
            username,
            email: change.email,
            password_hash,
        };

        let user = self
            .store
            .update_profile(user_id, &update)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        tracing::info!(user_id = %user.id, "User profile updated");
        Ok(user)
    }

    /// Remove an account. Fails with `NotFound` if it does not exist.
    pub async fn delete(&self, user_id: &str) -> Result<(), AppError> {
        if !self.store.delete_user(user_id).await? {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        tracing::info!(user_id, "User account deleted");
        Ok(())
    }
}

/// bcrypt on a blocking thread.
async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("hash task failed: {}", e)))?
        .map_err(|e| AppError::Internal(anyhow::anyhow!("password hashing failed: {}", e)))
}

async fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let password = password.to_string();
    let hash = hash.to_string();
    let result = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("verify task failed: {}", e)))?;

    // A corrupt stored hash is treated as a mismatch rather than a 500.
    Ok(result.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Stored password hash could not be parsed");
        false
    }))
}
