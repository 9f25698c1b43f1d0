// SPDX-License-Identifier: MIT

//! Expense models: the durable record, the confirmation request, and the
//! closed partial-update set.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A single line item extracted from a receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub price: f64,
    pub quantity: f64,
}

/// Durable expense record stored in Firestore.
///
/// Created only on confirmation; owned exclusively by `user_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    /// Document ID
    pub id: String,
    /// Owner (User.id)
    pub user_id: String,
    pub amount: f64,
    pub merchant: String,
    pub category: String,
    /// Filename of the uploaded receipt image
    pub receipt_image: String,
    /// When the receipt was uploaded (RFC 3339)
    pub upload_date: String,
    pub is_tax_deductible: bool,
    pub deduction_reason: Option<String>,
    /// Receipt date as printed (YYYY-MM-DD), if extracted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<LineItem>>,
}

impl Expense {
    /// Whether `user_id` owns this expense. Every read or write that takes
    /// an expense ID must pass this before touching the record.
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

/// User-confirmed receipt fields posted back after review.
///
/// Numeric ranges match `ExpenseUpdate`. Text fields stay unconstrained
/// here: extraction defaults the merchant to an empty string, and an
/// unedited review payload must confirm as-is.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ConfirmExpenseRequest {
    #[validate(range(min = 0.0))]
    pub amount: f64,
    pub merchant: String,
    pub category: String,
    pub receipt_image: String,
    pub upload_date: String,
    #[serde(default)]
    pub is_tax_deductible: bool,
    #[serde(default)]
    pub deduction_reason: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0))]
    pub tax_rate: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub tax_amount: Option<f64>,
    #[serde(default)]
    pub items: Option<Vec<LineItem>>,
}

impl ConfirmExpenseRequest {
    /// Build the durable expense owned by `user_id`.
    pub fn into_expense(self, id: String, user_id: String) -> Expense {
        Expense {
            id,
            user_id,
            amount: self.amount,
            merchant: self.merchant,
            category: self.category,
            receipt_image: self.receipt_image,
            upload_date: self.upload_date,
            is_tax_deductible: self.is_tax_deductible,
            deduction_reason: self.deduction_reason,
            date: self.date,
            invoice_number: self.invoice_number,
            tax_rate: self.tax_rate,
            tax_amount: self.tax_amount,
            items: self.items,
        }
    }
}

/// Closed set of updatable expense fields.
///
/// Replaces the free-form key/value overlay of earlier drafts: only these
/// fields can change, each validated independently. Ownership is checked
/// before this is applied.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ExpenseUpdate {
    #[validate(range(min = 0.0))]
    pub amount: Option<f64>,
    #[validate(length(min = 1, max = 256))]
    pub merchant: Option<String>,
    #[validate(length(min = 1, max = 128))]
    pub category: Option<String>,
    #[validate(length(min = 1, max = 512))]
    pub receipt_image: Option<String>,
    pub is_tax_deductible: Option<bool>,
    pub deduction_reason: Option<String>,
    pub date: Option<String>,
    pub invoice_number: Option<String>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub tax_rate: Option<f64>,
    #[validate(range(min = 0.0))]
    pub tax_amount: Option<f64>,
}

impl ExpenseUpdate {
    /// Merge the set fields into `expense`, returning how many changed.
    pub fn apply(&self, expense: &mut Expense) -> u64 {
        let mut changed = 0;

        if let Some(amount) = self.amount {
            if expense.amount != amount {
                expense.amount = amount;
                changed += 1;
            }
        }
        if let Some(merchant) = &self.merchant {
            if expense.merchant != *merchant {
                expense.merchant = merchant.clone();
                changed += 1;
            }
        }
        if let Some(category) = &self.category {
            if expense.category != *category {
                expense.category = category.clone();
                changed += 1;
            }
        }
        if let Some(receipt_image) = &self.receipt_image {
            if expense.receipt_image != *receipt_image {
                expense.receipt_image = receipt_image.clone();
                changed += 1;
            }
        }
        if let Some(is_tax_deductible) = self.is_tax_deductible {
            if expense.is_tax_deductible != is_tax_deductible {
                expense.is_tax_deductible = is_tax_deductible;
                changed += 1;
            }
        }
        if let Some(deduction_reason) = &self.deduction_reason {
            if expense.deduction_reason.as_deref() != Some(deduction_reason) {
                expense.deduction_reason = Some(deduction_reason.clone());
                changed += 1;
            }
        }
        if let Some(date) = &self.date {
            if expense.date.as_deref() != Some(date) {
                expense.date = Some(date.clone());
                changed += 1;
            }
        }
        if let Some(invoice_number) = &self.invoice_number {
            if expense.invoice_number.as_deref() != Some(invoice_number) {
                expense.invoice_number = Some(invoice_number.clone());
                changed += 1;
            }
        }
        if let Some(tax_rate) = self.tax_rate {
            if expense.tax_rate != Some(tax_rate) {
                expense.tax_rate = Some(tax_rate);
                changed += 1;
            }
        }
        if let Some(tax_amount) = self.tax_amount {
            if expense.tax_amount != Some(tax_amount) {
                expense.tax_amount = Some(tax_amount);
                changed += 1;
            }
        }

        changed
    }
}
