// SPDX-License-Identifier: MIT

//! Application error types with consistent API responses.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Username already registered")]
    DuplicateUser,

    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    Unauthenticated,

    #[error("User not found")]
    UserNotFound,

    #[error("Expense not found or unauthorized access")]
    NotFoundOrUnauthorized,

    #[error("Receipt extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl AppError {
    /// Status code this error renders as.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::DuplicateUser => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::NotFoundOrUnauthorized => StatusCode::NOT_FOUND,
            AppError::ExtractionFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let (error, details) = match &self {
            AppError::DuplicateUser => ("duplicate_user", Some(self.to_string())),
            AppError::InvalidCredentials => ("invalid_credentials", Some(self.to_string())),
            AppError::Unauthenticated => ("unauthenticated", None),
            AppError::UserNotFound => ("user_not_found", None),
            AppError::NotFoundOrUnauthorized => {
                // Ownership miss and missing record are deliberately the same
                // response so callers cannot probe for existence.
                ("not_found", Some(self.to_string()))
            }
            AppError::ExtractionFailed(msg) => {
                tracing::error!(error = %msg, "Receipt extraction failed");
                ("extraction_failed", Some("Failed to process receipt".to_string()))
            }
            AppError::BadRequest(msg) => ("bad_request", Some(msg.clone())),
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                ("database_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                ("internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        // Failed logins advertise the bearer scheme, matching the token endpoint.
        if matches!(
            self,
            AppError::InvalidCredentials | AppError::Unauthenticated
        ) {
            return (status, [(header::WWW_AUTHENTICATE, "Bearer")], Json(body))
                .into_response();
        }

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
