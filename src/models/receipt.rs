// SPDX-License-Identifier: MIT

//! Receipt extraction types.
//!
//! `ReceiptFields` is the fixed schema the structured-extraction collaborator
//! must produce; `ExtractionResult` is what the client reviews and round-trips
//! back on confirmation. Neither is written to the store: the upload step is
//! purely advisory, only a confirmed expense is durable.

use crate::models::LineItem;
use serde::{Deserialize, Serialize};

/// Default expense category until the user picks one.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Fixed output schema for the structured-extraction collaborator.
///
/// Every field is optional: the model reports only what the receipt shows,
/// and field sets vary widely across receipts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReceiptFields {
    /// Total amount as a 2-decimal number
    pub total_amount: Option<f64>,
    /// Receipt date, YYYY-MM-DD
    pub date: Option<String>,
    pub vendor: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub items: Vec<LineItem>,
    pub invoice_number: Option<String>,
    pub tax_rate: Option<f64>,
    pub tax_amount: Option<f64>,
    pub payment_method: Option<String>,
    pub business_purpose: Option<String>,
}

/// Extracted receipt data returned to the caller for confirmation.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    pub amount: f64,
    pub merchant: String,
    pub category: String,
    /// When the receipt was uploaded (RFC 3339)
    pub upload_date: String,
    pub is_tax_deductible: bool,
    pub deduction_reason: Option<String>,
    /// Filename of the uploaded image
    pub receipt_image: String,
    pub date: String,
    pub invoice_number: String,
    pub tax_rate: f64,
    pub tax_amount: f64,
    pub items: Vec<LineItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_purpose: Option<String>,
}

impl ExtractionResult {
    /// Assemble the review payload, defaulting absent fields.
    ///
    /// Defaults are fixed sentinels, never guesses: amount 0.0, merchant
    /// empty, category "Uncategorized", deductibility left for the user.
    pub fn from_fields(fields: ReceiptFields, receipt_image: &str, upload_date: String) -> Self {
        Self {
            amount: fields.total_amount.unwrap_or(0.0),
            merchant: fields.vendor.unwrap_or_default(),
            category: fields.category.unwrap_or_else(|| UNCATEGORIZED.to_string()),
            upload_date,
            is_tax_deductible: false,
            deduction_reason: None,
            receipt_image: receipt_image.to_string(),
            date: fields.date.unwrap_or_default(),
            invoice_number: fields.invoice_number.unwrap_or_default(),
            tax_rate: fields.tax_rate.unwrap_or(0.0),
            tax_amount: fields.tax_amount.unwrap_or(0.0),
            items: fields.items,
            payment_method: fields.payment_method,
            business_purpose: fields.business_purpose,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_empty_extraction() {
        let result = ExtractionResult::from_fields(
            ReceiptFields::default(),
            "blank.jpg",
            "2026-08-01T12:00:00Z".to_string(),
        );

        assert_eq!(result.amount, 0.0);
        assert_eq!(result.merchant, "");
        assert_eq!(result.category, UNCATEGORIZED);
        assert!(!result.is_tax_deductible);
        assert!(result.deduction_reason.is_none());
        assert_eq!(result.receipt_image, "blank.jpg");
        assert_eq!(result.tax_rate, 0.0);
        assert!(result.items.is_empty());
    }

    #[test]
    fn test_extracted_values_pass_through() {
        let fields = ReceiptFields {
            total_amount: Some(18.75),
            date: Some("2026-07-04".to_string()),
            vendor: Some("Blue Bottle".to_string()),
            items: vec![LineItem {
                name: "Latte".to_string(),
                price: 6.25,
                quantity: 3.0,
            }],
            ..Default::default()
        };

        let result = ExtractionResult::from_fields(
            fields,
            "coffee.png",
            "2026-08-01T12:00:00Z".to_string(),
        );

        assert_eq!(result.amount, 18.75);
        assert_eq!(result.merchant, "Blue Bottle");
        assert_eq!(result.date, "2026-07-04");
        assert_eq!(result.items.len(), 1);
        // Category was not extracted, so the sentinel applies
        assert_eq!(result.category, UNCATEGORIZED);
    }
}
