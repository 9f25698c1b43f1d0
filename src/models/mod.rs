// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod expense;
pub mod receipt;
pub mod user;

pub use expense::{ConfirmExpenseRequest, Expense, ExpenseUpdate, LineItem};
pub use receipt::{ExtractionResult, ReceiptFields};
pub use user::User;

use rand::RngCore;

/// Mint an opaque 24-hex-character record identifier.
pub fn new_record_id() -> String {
    let mut bytes = [0u8; 12];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
