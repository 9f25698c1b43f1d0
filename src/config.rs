// SPDX-License-Identifier: MIT

//! Application configuration loaded from environment variables.
//!
//! Secrets (JWT signing key, collaborator API keys) are read once at startup
//! and cached in memory; nothing is rotated at runtime.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment variables (non-sensitive) ---
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Base URL of the structured-extraction (chat completions) API
    pub extraction_base_url: String,
    /// Model name for structured extraction
    pub extraction_model: String,

    // --- Secrets ---
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Google Cloud Vision API key (OCR)
    pub vision_api_key: String,
    /// API key for the structured-extraction service
    pub extraction_api_key: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            extraction_base_url: env::var("EXTRACTION_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            extraction_model: env::var("EXTRACTION_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),

            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            vision_api_key: env::var("VISION_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("VISION_API_KEY"))?,
            extraction_api_key: env::var("EXTRACTION_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("EXTRACTION_API_KEY"))?,
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            extraction_base_url: "http://localhost:9000/v1".to_string(),
            extraction_model: "test-model".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!!".to_vec(),
            vision_api_key: "test_vision_key".to_string(),
            extraction_api_key: "test_extraction_key".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
