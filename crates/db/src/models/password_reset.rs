//! Password reset token row.

use ecocusco_core::types::Timestamp;
use sqlx::FromRow;

/// Row from `password_resets`, keyed by email (one live token per account).
///
/// Only the SHA-256 digest of the emailed token is stored, so a database
/// leak does not expose usable reset links.
#[derive(Debug, Clone, FromRow)]
pub struct PasswordReset {
    pub email: String,
    pub token_hash: String,
    pub expires_at: Timestamp,
}
