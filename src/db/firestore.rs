// SPDX-License-Identifier: MIT

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (credential store, keyed by username)
//! - Expenses (confirmed expense records, keyed by opaque ID)
//!
//! The handle is cloned into request handlers through `AppState`; the
//! underlying client is pool-backed and safe to share.

use crate::db::collections;
use crate::error::AppError;
use crate::models::{Expense, User};

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

    /// Get a user by username (the document ID). Case-sensitive exact match.
    pub async fn get_user(&self, username: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(username)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new user record.
    ///
    /// The caller checks for duplicates first, but two concurrent
    /// registrations can both pass that check; the keyed insert then fails
    /// for the loser, which must surface as `DuplicateUser`, not a 500.
    pub async fn create_user(&self, user: &User) -> Result<(), AppError> {
        let _: User = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::USERS)
            .document_id(&user.username)
            .object(user)
            .execute()
            .await
            .map_err(|e| match e {
                firestore::errors::FirestoreError::DataConflictError(_) => {
                    AppError::DuplicateUser
                }
                e => AppError::Database(e.to_string()),
            })?;
        Ok(())
    }

    // ─── Expense Operations ──────────────────────────────────────

    /// Get an expense by its document ID.
    pub async fn get_expense(&self, expense_id: &str) -> Result<Option<Expense>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::EXPENSES)
            .obj()
            .one(expense_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a confirmed expense (single atomic write).
    pub async fn insert_expense(&self, expense: &Expense) -> Result<(), AppError> {
        let _: Expense = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::EXPENSES)
            .document_id(&expense.id)
            .object(expense)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Overwrite an expense after a partial update has been merged.
    pub async fn set_expense(&self, expense: &Expense) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::EXPENSES)
            .document_id(&expense.id)
            .object(expense)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// List expenses owned by a user with offset pagination.
    ///
    /// Ordered by upload date descending with the document ID as tie-break,
    /// so skip/limit pagination stays stable between calls.
    pub async fn list_expenses(
        &self,
        user_id: &str,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<Expense>, AppError> {
        let user_id = user_id.to_string();

        self.get_client()?
            .fluent()
            .select()
            .from(collections::EXPENSES)
            .filter(move |q| q.for_all([q.field("user_id").eq(user_id.clone())]))
            .order_by([
                ("upload_date", firestore::FirestoreQueryDirection::Descending),
                ("id", firestore::FirestoreQueryDirection::Descending),
            ])
            .limit(limit)
            .offset(skip)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
