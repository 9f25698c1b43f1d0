// SPDX-License-Identifier: MIT

//! User model for storage and auth resolution.

use serde::{Deserialize, Serialize};

/// User record stored in Firestore, keyed by username.
///
/// The password hash stays internal: responses never serialize a `User`
/// directly, only purpose-built response types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Opaque identifier, used as the owner reference on expenses
    pub id: String,
    /// Unique username (also the document ID)
    pub username: String,
    /// Argon2id hash of the password; the plaintext is never stored
    pub password_hash: String,
    /// When the user registered (RFC 3339)
    pub created_at: String,
}
