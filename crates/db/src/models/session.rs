//! Server-side session row.

use ecocusco_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// Row from the `sesiones` table.
///
/// The primary key is the SHA-256 digest of the opaque cookie token; the
/// plaintext token only ever lives in the client's cookie. `data` is a JSON
/// document holding the CSRF token, the cached user-name snapshot, flash
/// messages, stored validation errors, and old form input.
#[derive(Debug, Clone, FromRow)]
pub struct SessionRecord {
    pub token_hash: String,
    pub user_id: Option<DbId>,
    pub data: String,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a session row.
#[derive(Debug, Clone)]
pub struct CreateSession {
    pub token_hash: String,
    pub user_id: Option<DbId>,
    pub data: String,
    pub expires_at: Timestamp,
}
