// SPDX-License-Identifier: MIT

//! Text-extraction collaborator: Google Cloud Vision OCR over REST.
//!
//! The core treats this as a fallible black box. A receipt with no
//! detectable text, a transport failure, or an API-level error all surface
//! as `ExtractionFailed` for the current request; there are no retries.

use crate::error::AppError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use std::time::Duration;

/// Request timeout so a stalled OCR call cannot hold a worker indefinitely.
const OCR_TIMEOUT: Duration = Duration::from_secs(30);

/// Google Cloud Vision OCR client.
#[derive(Clone)]
pub struct OcrClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<ImageResponse>,
}

#[derive(Deserialize)]
struct ImageResponse {
    #[serde(default, rename = "textAnnotations")]
    text_annotations: Vec<TextAnnotation>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct TextAnnotation {
    description: String,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

impl OcrClient {
    /// Create a new Vision client with an API key.
    pub fn new(api_key: String) -> anyhow::Result<Self> {
        Ok(Self {
            http: reqwest::Client::builder().timeout(OCR_TIMEOUT).build()?,
            base_url: "https://vision.googleapis.com/v1".to_string(),
            api_key,
        })
    }

    /// Extract the full text block from a receipt image.
    ///
    /// Returns `ExtractionFailed` if the image contains no detectable text.
    pub async fn detect_text(&self, image_bytes: &[u8]) -> Result<String, AppError> {
        let url = format!("{}/images:annotate", self.base_url);

        let body = serde_json::json!({
            "requests": [{
                "image": { "content": STANDARD.encode(image_bytes) },
                "features": [{ "type": "TEXT_DETECTION" }]
            }]
        });

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExtractionFailed(format!("OCR request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::ExtractionFailed(format!(
                "OCR service returned {}: {}",
                status, text
            )));
        }

        let annotate: AnnotateResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExtractionFailed(format!("Invalid OCR response: {}", e)))?;

        let image_response = annotate
            .responses
            .into_iter()
            .next()
            .ok_or_else(|| AppError::ExtractionFailed("Empty OCR response".to_string()))?;

        if let Some(err) = image_response.error {
            return Err(AppError::ExtractionFailed(format!(
                "OCR error: {}",
                err.message
            )));
        }

        // The first annotation is the full text block; the rest are per-word.
        match image_response.text_annotations.into_iter().next() {
            Some(annotation) if !annotation.description.trim().is_empty() => {
                Ok(annotation.description)
            }
            _ => Err(AppError::ExtractionFailed(
                "No text found in image".to_string(),
            )),
        }
    }
}
