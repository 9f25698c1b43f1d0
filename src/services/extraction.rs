// SPDX-License-Identifier: MIT

//! Structured-extraction collaborator: maps raw receipt text to the fixed
//! `ReceiptFields` schema through an OpenAI-compatible chat-completions API.
//!
//! The model is instructed to answer with a single JSON object; anything
//! that does not deserialize into the schema is an `ExtractionFailed`,
//! never a partially-guessed record.

use crate::error::AppError;
use crate::models::ReceiptFields;
use serde::Deserialize;
use std::time::Duration;

/// Request timeout so a stalled model call cannot hold a worker indefinitely.
const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(60);

const SYSTEM_PROMPT: &str = "You extract structured data from receipt text. \
Respond with a single JSON object and nothing else, using exactly these keys: \
total_amount (number, 2 decimals), date (string, YYYY-MM-DD), vendor (string), \
items (array of {name, price, quantity}), invoice_number (string), \
tax_rate (number), tax_amount (number), payment_method (string), \
business_purpose (string). Omit any key the receipt does not show. \
Never invent values.";

/// Structured extraction client.
#[derive(Clone)]
pub struct StructuredExtractor {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

impl StructuredExtractor {
    /// Create a new extraction client.
    pub fn new(base_url: String, api_key: String, model: String) -> anyhow::Result<Self> {
        Ok(Self {
            http: reqwest::Client::builder()
                .timeout(EXTRACTION_TIMEOUT)
                .build()?,
            base_url,
            api_key,
            model,
        })
    }

    /// Map raw receipt text to the fixed field schema.
    pub async fn extract_fields(&self, receipt_text: &str) -> Result<ReceiptFields, AppError> {
        let url = format!("{}/chat/completions", self.base_url);

        let body = serde_json::json!({
            "model": self.model,
            "temperature": 0,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": receipt_text }
            ]
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                AppError::ExtractionFailed(format!("Extraction request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::ExtractionFailed(format!(
                "Extraction service returned {}: {}",
                status, text
            )));
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            AppError::ExtractionFailed(format!("Invalid extraction response: {}", e))
        })?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AppError::ExtractionFailed("Empty extraction response".to_string()))?;

        parse_fields(&content)
    }
}

/// Parse the model's reply into the schema.
///
/// Some models wrap JSON in Markdown fences even when told not to, so those
/// are stripped before deserializing.
fn parse_fields(content: &str) -> Result<ReceiptFields, AppError> {
    let trimmed = strip_code_fences(content);

    serde_json::from_str(trimmed).map_err(|e| {
        AppError::ExtractionFailed(format!("Extraction output did not match schema: {}", e))
    })
}

fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop an optional language tag after the opening fence
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_schema() {
        let content = r#"{
            "total_amount": 107.30,
            "date": "2026-03-14",
            "vendor": "Staples",
            "items": [
                { "name": "Paper", "price": 45.00, "quantity": 2 },
                { "name": "Toner", "price": 17.30, "quantity": 1 }
            ],
            "invoice_number": "INV-4417",
            "tax_rate": 8.5,
            "tax_amount": 8.41,
            "payment_method": "VISA",
            "business_purpose": "office supplies"
        }"#;

        let fields = parse_fields(content).unwrap();
        assert_eq!(fields.total_amount, Some(107.30));
        assert_eq!(fields.vendor.as_deref(), Some("Staples"));
        assert_eq!(fields.items.len(), 2);
        assert_eq!(fields.invoice_number.as_deref(), Some("INV-4417"));
    }

    #[test]
    fn test_parse_tolerates_missing_fields() {
        let fields = parse_fields(r#"{ "vendor": "Corner Deli" }"#).unwrap();
        assert_eq!(fields.vendor.as_deref(), Some("Corner Deli"));
        assert!(fields.total_amount.is_none());
        assert!(fields.items.is_empty());
    }

    #[test]
    fn test_parse_strips_markdown_fences() {
        let content = "```json\n{ \"total_amount\": 9.99 }\n```";
        let fields = parse_fields(content).unwrap();
        assert_eq!(fields.total_amount, Some(9.99));
    }

    #[test]
    fn test_parse_rejects_non_json() {
        let err = parse_fields("Sorry, I could not read this receipt.").unwrap_err();
        assert!(matches!(err, AppError::ExtractionFailed(_)));
    }

    #[test]
    fn test_parse_rejects_schema_mismatch() {
        // total_amount must be a number, not a string
        let err = parse_fields(r#"{ "total_amount": "a lot" }"#).unwrap_err();
        assert!(matches!(err, AppError::ExtractionFailed(_)));
    }
}
