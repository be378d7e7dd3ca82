// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore-backed user store.
//!
//! Users live in the `users` collection keyed by their UUID. Each address
//! is claimed by a document in `user_emails` keyed by the normalized email,
//! and every read-modify-write runs in a Firestore transaction, so
//! concurrent registrations and favorite edits serialize on the server.

use super::{collections, ProfileUpdate, UserStore, DUPLICATE_EMAIL};
use crate::error::AppError;
use crate::models::user::normalize_email;
use crate::models::{FavoriteEntry, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use firestore::errors::{BackoffError, FirestoreError};
use serde::{Deserialize, Serialize};

type TxError = BackoffError<FirestoreError>;

/// Owner of an email address.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmailClaim {
    user_id: String,
}

/// Document ID for an email claim (`/` is not allowed in IDs).
fn email_doc_id(email: &str) -> String {
    urlencoding::encode(&normalize_email(email)).into_owned()
}

/// Change to a user's favorites, replayable if a transaction retries.
#[derive(Debug, Clone)]
enum FavoriteChange {
    Add(String, DateTime<Utc>),
    Remove(String),
}

impl FavoriteChange {
    /// Returns `true` if the list changed.
    fn apply(&self, user: &mut User) -> bool {
        match self {
            FavoriteChange::Add(artist_id, added_date) => user.add_favorite(artist_id, *added_date),
            FavoriteChange::Remove(artist_id) => user.remove_favorite(artist_id),
        }
    }
}

enum ProfileOutcome {
    Missing,
    EmailTaken,
    Updated(User),
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreUserStore {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreUserStore {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // The emulator needs an unauthenticated connection
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a disconnected client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Transactional read-modify-write on a user's favorites.
    async fn modify_favorites(
        &self,
        user_id: &str,
        change: FavoriteChange,
    ) -> Result<Option<Vec<FavoriteEntry>>, AppError> {
        let user_id = user_id.to_string();

        self.get_client()?
            .run_transaction(|db, transaction| {
                let user_id = user_id.clone();
                let change = change.clone();
                Box::pin(async move {
                    let user: Option<User> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::USERS)
                        .obj()
                        .one(&user_id)
                        .await?;
                    let Some(mut user) = user else {
                        return Ok(None);
                    };

                    if change.apply(&mut user) {
                        db.fluent()
                            .update()
                            .in_col(collections::USERS)
                            .document_id(&user_id)
                            .object(&user)
                            .add_to_transaction(transaction)?;
                    }

                    Ok::<_, TxError>(Some(user.favorite_artists))
                })
            })
            .await
            .map_err(|e| AppError::Database(format!("Favorites transaction failed: {}", e)))
    }
}

#[async_trait]
impl UserStore for FirestoreUserStore {
    async fn create_user(&self, user: &User) -> Result<(), AppError> {
        let user = user.clone();

        // Reading the claim inside the transaction makes two registrations
        // for one address conflict; the loser retries and sees the claim.
        let created = self
            .get_client()?
            .run_transaction(|db, transaction| {
                let user = user.clone();
                Box::pin(async move {
                    let email_id = email_doc_id(&user.email);
                    let claim: Option<EmailClaim> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::USER_EMAILS)
                        .obj()
                        .one(&email_id)
                        .await?;
                    if claim.is_some() {
                        return Ok(false);
                    }

                    db.fluent()
                        .update()
                        .in_col(collections::USER_EMAILS)
                        .document_id(&email_id)
                        .object(&EmailClaim {
                            user_id: user.id.clone(),
                        })
                        .add_to_transaction(transaction)?;
                    db.fluent()
                        .update()
                        .in_col(collections::USERS)
                        .document_id(&user.id)
                        .object(&user)
                        .add_to_transaction(transaction)?;

                    Ok::<_, TxError>(true)
                })
            })
            .await
            .map_err(|e| AppError::Database(format!("Create user transaction failed: {}", e)))?;

        if !created {
            return Err(AppError::Conflict(DUPLICATE_EMAIL.to_string()));
        }

        tracing::debug!(user_id = %user.id, "User document created");
        Ok(())
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let claim: Option<EmailClaim> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USER_EMAILS)
            .obj()
            .one(email_doc_id(email))
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match claim {
            Some(claim) => self.get_user(&claim.user_id).await,
            None => Ok(None),
        }
    }

    async fn update_profile(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, AppError> {
        let user_id = user_id.to_string();
        let update = update.clone();

        let outcome = self
            .get_client()?
            .run_transaction(|db, transaction| {
                let user_id = user_id.clone();
                let update = update.clone();
                Box::pin(async move {
                    let user: Option<User> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::USERS)
                        .obj()
                        .one(&user_id)
                        .await?;
                    let Some(mut user) = user else {
                        return Ok(ProfileOutcome::Missing);
                    };

                    if let Some(email) = update.email.as_deref() {
                        let claim: Option<EmailClaim> = db
                            .fluent()
                            .select()
                            .by_id_in(collections::USER_EMAILS)
                            .obj()
                            .one(email_doc_id(email))
                            .await?;
                        if claim.is_some_and(|c| c.user_id != user_id) {
                            return Ok(ProfileOutcome::EmailTaken);
                        }
                    }

                    if let Some(old_email) = update.apply(&mut user) {
                        db.fluent()
                            .delete()
                            .from(collections::USER_EMAILS)
                            .document_id(email_doc_id(&old_email))
                            .add_to_transaction(transaction)?;
                        db.fluent()
                            .update()
                            .in_col(collections::USER_EMAILS)
                            .document_id(email_doc_id(&user.email))
                            .object(&EmailClaim {
                                user_id: user_id.clone(),
                            })
                            .add_to_transaction(transaction)?;
                    }

                    db.fluent()
                        .update()
                        .in_col(collections::USERS)
                        .document_id(&user_id)
                        .object(&user)
                        .add_to_transaction(transaction)?;

                    Ok::<_, TxError>(ProfileOutcome::Updated(user))
                })
            })
            .await
            .map_err(|e| AppError::Database(format!("Profile transaction failed: {}", e)))?;

        match outcome {
            ProfileOutcome::Missing => Ok(None),
            ProfileOutcome::EmailTaken => Err(AppError::Conflict(DUPLICATE_EMAIL.to_string())),
            ProfileOutcome::Updated(user) => Ok(Some(user)),
        }
    }

    async fn delete_user(&self, user_id: &str) -> Result<bool, AppError> {
        let user_id = user_id.to_string();

        self.get_client()?
            .run_transaction(|db, transaction| {
                let user_id = user_id.clone();
                Box::pin(async move {
                    let user: Option<User> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::USERS)
                        .obj()
                        .one(&user_id)
                        .await?;
                    let Some(user) = user else {
                        return Ok(false);
                    };

                    db.fluent()
                        .delete()
                        .from(collections::USERS)
                        .document_id(&user_id)
                        .add_to_transaction(transaction)?;
                    db.fluent()
                        .delete()
                        .from(collections::USER_EMAILS)
                        .document_id(email_doc_id(&user.email))
                        .add_to_transaction(transaction)?;

                    Ok::<_, TxError>(true)
                })
            })
            .await
            .map_err(|e| AppError::Database(format!("Delete user transaction failed: {}", e)))
    }

    async fn add_favorite(
        &self,
        user_id: &str,
        artist_id: &str,
        added_date: DateTime<Utc>,
    ) -> Result<Option<Vec<FavoriteEntry>>, AppError> {
        self.modify_favorites(
            user_id,
            FavoriteChange::Add(artist_id.to_string(), added_date),
        )
        .await
    }

    async fn remove_favorite(
        &self,
        user_id: &str,
        artist_id: &str,
    ) -> Result<Option<Vec<FavoriteEntry>>, AppError> {
        self.modify_favorites(user_id, FavoriteChange::Remove(artist_id.to_string()))
            .await
    }
}
