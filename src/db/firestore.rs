// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile storage, admin flag)
//! - Flats (listings, favorites membership)
//! - Messages (listing conversations, read flags)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{Flat, Message, User};

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
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

        // Use ExternalJwtFunctionSource to provide a dummy token without needing async-trait
        // or a custom TokenSource implementation struct.
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

    /// Create a mock Firestore client for testing (offline mode).
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

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user profile by uid.
    pub async fn get_user(&self, uid: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(uid)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a user profile.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.uid)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// List every user profile (admin view).
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .order_by([(
                "created_at",
                firestore::FirestoreQueryDirection::Ascending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a user profile document.
    pub async fn delete_user(&self, uid: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::USERS)
            .document_id(uid)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Flat Operations ─────────────────────────────────────────

    /// Get a flat by ID.
    pub async fn get_flat(&self, flat_id: &str) -> Result<Option<Flat>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::FLATS)
            .obj()
            .one(flat_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Fetch every flat (the listing view loads the full working set).
    pub async fn list_flats(&self) -> Result<Vec<Flat>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::FLATS)
            .order_by([(
                "created_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get all flats owned by a user.
    pub async fn flats_by_owner(&self, owner_id: &str) -> Result<Vec<Flat>, AppError> {
        let owner_id = owner_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::FLATS)
            .filter(move |q| q.for_all([q.field("owner_id").eq(owner_id.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get all flats a user has favorited (array-membership query).
    pub async fn flats_favorited_by(&self, uid: &str) -> Result<Vec<Flat>, AppError> {
        let uid = uid.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::FLATS)
            .filter(move |q| q.for_all([q.field("favorites").array_contains(uid.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a flat document.
    pub async fn upsert_flat(&self, flat: &Flat) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::FLATS)
            .document_id(&flat.id)
            .object(flat)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a flat document.
    pub async fn delete_flat(&self, flat_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::FLATS)
            .document_id(flat_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Atomically add `uid` to a flat's favorites set.
    ///
    /// Uses the array-union transform, so concurrent toggles from two
    /// clients cannot produce duplicates or lost updates.
    pub async fn add_favorite(&self, flat_id: &str, uid: &str) -> Result<(), AppError> {
        self.apply_favorite_transform(flat_id, uid, true).await
    }

    /// Atomically remove `uid` from a flat's favorites set.
    pub async fn remove_favorite(&self, flat_id: &str, uid: &str) -> Result<(), AppError> {
        self.apply_favorite_transform(flat_id, uid, false).await
    }

    async fn apply_favorite_transform(
        &self,
        flat_id: &str,
        uid: &str,
        add: bool,
    ) -> Result<(), AppError> {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        client
            .fluent()
            .update()
            .in_col(collections::FLATS)
            .document_id(flat_id)
            .transforms(|t| {
                t.fields([if add {
                    t.field("favorites")
                        .append_missing_elements([uid.to_string()])
                } else {
                    t.field("favorites").remove_all_from_array([uid.to_string()])
                }])
            })
            .only_transform()
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add favorite transform: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        Ok(())
    }

    // ─── Message Operations ──────────────────────────────────────

    /// Get a message by ID.
    pub async fn get_message(&self, message_id: &str) -> Result<Option<Message>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::MESSAGES)
            .obj()
            .one(message_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store a message.
    pub async fn upsert_message(&self, message: &Message) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::MESSAGES)
            .document_id(&message.id)
            .object(message)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// All messages addressed to a user, newest first.
    pub async fn messages_for_recipient(&self, uid: &str) -> Result<Vec<Message>, AppError> {
        let uid = uid.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::MESSAGES)
            .filter(move |q| q.for_all([q.field("recipient_id").eq(uid.clone())]))
            .order_by([(
                "created_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All messages sent by a user, newest first.
    pub async fn messages_for_sender(&self, uid: &str) -> Result<Vec<Message>, AppError> {
        let uid = uid.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::MESSAGES)
            .filter(move |q| q.for_all([q.field("sender_id").eq(uid.clone())]))
            .order_by([(
                "created_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// The full conversation for one flat, oldest first.
    pub async fn messages_for_flat(&self, flat_id: &str) -> Result<Vec<Message>, AppError> {
        let flat_id = flat_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::MESSAGES)
            .filter(move |q| q.for_all([q.field("flat_id").eq(flat_id.clone())]))
            .order_by([(
                "created_at",
                firestore::FirestoreQueryDirection::Ascending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a message document.
    pub async fn delete_message(&self, message_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::MESSAGES)
            .document_id(message_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
