// SPDX-License-Identifier: MIT

//! Registration and token-issuing routes.

use axum::{extract::State, routing::post, Form, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::auth::create_jwt;
use crate::models::{self, User};
use crate::services::password::{hash_password, verify_password};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/token", post(login))
}

/// Credentials form, shared by register and token endpoints.
#[derive(Deserialize, Validate)]
pub struct CredentialsForm {
    #[validate(length(min = 3, max = 64))]
    pub username: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub msg: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Register a new user.
///
/// Fails with `DuplicateUser` on a case-sensitive exact username match.
async fn register(
    State(state): State<Arc<AppState>>,
    Form(form): Form<CredentialsForm>,
) -> Result<Json<RegisterResponse>> {
    form.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    if state.db.get_user(&form.username).await?.is_some() {
        return Err(AppError::DuplicateUser);
    }

    let user = User {
        id: models::new_record_id(),
        username: form.username,
        password_hash: hash_password(&form.password)?,
        created_at: chrono::Utc::now().to_rfc3339(),
    };

    state.db.create_user(&user).await?;

    tracing::info!(username = %user.username, "User registered");

    Ok(Json(RegisterResponse {
        msg: "User created successfully".to_string(),
    }))
}

/// Exchange credentials for a 30-minute bearer token.
///
/// Unknown username and wrong password both map to `InvalidCredentials`.
async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<CredentialsForm>,
) -> Result<Json<TokenResponse>> {
    let user = state
        .db
        .get_user(&form.username)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(&form.password, &user.password_hash) {
        return Err(AppError::InvalidCredentials);
    }

    let access_token = create_jwt(&user.username, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    tracing::info!(username = %user.username, "Session token issued");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}
