// SPDX-License-Identifier: MIT

//! Expense routes: receipt ingestion, listing, and updates.
//!
//! Upload runs the two-stage extraction (OCR, then structured extraction)
//! and returns the result for review without writing anything; only the
//! confirm step creates a durable expense. All reads and writes are scoped
//! to the authenticated owner.

use axum::{
    extract::{Multipart, Path, Query, State},
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::auth::CurrentUser;
use crate::models::{self, ConfirmExpenseRequest, Expense, ExpenseUpdate, ExtractionResult};
use crate::AppState;

/// Expense routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/expenses/upload-receipt/", post(upload_receipt))
        .route("/api/expenses/confirm-receipt/", post(confirm_receipt))
        .route("/api/expenses/list/", get(list_expenses))
        .route(
            "/api/expenses/update-collection/{expense_id}",
            put(update_expense),
        )
}

// ─── Receipt Ingestion ───────────────────────────────────────

/// Upload a receipt image and return the extracted fields for review.
///
/// Nothing is persisted here: the client round-trips the (possibly edited)
/// fields back through the confirm endpoint.
async fn upload_receipt(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> Result<Json<ExtractionResult>> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("receipt").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?;
            upload = Some((filename, bytes.to_vec()));
            break;
        }
    }

    let (filename, image_bytes) =
        upload.ok_or_else(|| AppError::BadRequest("Missing 'file' field".to_string()))?;

    tracing::info!(
        username = %user.username,
        filename = %filename,
        size = image_bytes.len(),
        "Processing receipt upload"
    );

    let receipt_text = state.ocr.detect_text(&image_bytes).await?;
    let fields = state.extractor.extract_fields(&receipt_text).await?;

    let result =
        ExtractionResult::from_fields(fields, &filename, chrono::Utc::now().to_rfc3339());

    Ok(Json(result))
}

/// Confirm reviewed receipt fields as a durable expense.
async fn confirm_receipt(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(request): Json<ConfirmExpenseRequest>,
) -> Result<Json<Expense>> {
    request
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let expense = request.into_expense(models::new_record_id(), user.id);

    // Single atomic insert: either the whole expense exists or nothing does.
    state.db.insert_expense(&expense).await?;

    tracing::info!(
        username = %user.username,
        expense_id = %expense.id,
        amount = expense.amount,
        "Expense confirmed"
    );

    Ok(Json(expense))
}

// ─── Listing ─────────────────────────────────────────────────

const MAX_LIMIT: u32 = 100;

#[derive(Deserialize)]
struct ListQuery {
    #[serde(default)]
    skip: u32,
    #[serde(default = "default_limit")]
    limit: u32,
}

fn default_limit() -> u32 {
    10
}

/// List the caller's expenses, newest upload first.
async fn list_expenses(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<Expense>>> {
    let limit = params.limit.min(MAX_LIMIT);

    let expenses = state.db.list_expenses(&user.id, params.skip, limit).await?;

    Ok(Json(expenses))
}

// ─── Updates ─────────────────────────────────────────────────

#[derive(Serialize)]
pub struct UpdateResponse {
    pub status: String,
    pub updated_count: u64,
}

/// Apply a partial update to an expense the caller owns.
///
/// A missing expense and one owned by someone else return the same error,
/// so callers cannot tell whether a record exists.
async fn update_expense(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(expense_id): Path<String>,
    Json(updates): Json<ExpenseUpdate>,
) -> Result<Json<UpdateResponse>> {
    updates
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let mut expense = state
        .db
        .get_expense(&expense_id)
        .await?
        .filter(|e| e.is_owned_by(&user.id))
        .ok_or(AppError::NotFoundOrUnauthorized)?;

    let updated_count = updates.apply(&mut expense);

    if updated_count > 0 {
        state.db.set_expense(&expense).await?;
        tracing::info!(
            username = %user.username,
            expense_id = %expense.id,
            updated_count,
            "Expense updated"
        );
    }

    Ok(Json(UpdateResponse {
        status: "success".to_string(),
        updated_count,
    }))
}
