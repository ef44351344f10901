//! Repository for the `password_resets` table.

use chrono::Utc;
use ecocusco_core::types::Timestamp;

use crate::models::password_reset::PasswordReset;
use crate::DbPool;

/// Provides token storage for the forgot/reset password flow. One live
/// token per email: issuing a new one replaces the previous.
pub struct PasswordResetRepo;

impl PasswordResetRepo {
    /// Store a reset token digest for an email, replacing any earlier one.
    pub async fn upsert(
        pool: &DbPool,
        email: &str,
        token_hash: &str,
        expires_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO password_resets (email, token_hash, expires_at)
             VALUES (?, ?, ?)
             ON CONFLICT(email) DO UPDATE SET
                token_hash = excluded.token_hash,
                expires_at = excluded.expires_at",
        )
        .bind(email)
        .bind(token_hash)
        .bind(expires_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Find a token row by digest, only if it has not expired.
    pub async fn find_valid(
        pool: &DbPool,
        token_hash: &str,
    ) -> Result<Option<PasswordReset>, sqlx::Error> {
        sqlx::query_as::<_, PasswordReset>(
            "SELECT email, token_hash, expires_at
             FROM password_resets
             WHERE token_hash = ? AND expires_at > ?",
        )
        .bind(token_hash)
        .bind(Utc::now())
        .fetch_optional(pool)
        .await
    }

    /// Consume (delete) the token for an email after a successful reset.
    pub async fn delete(pool: &DbPool, email: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM password_resets WHERE email = ?")
            .bind(email)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Sweep expired rows. Returns the count of deleted tokens.
    pub async fn cleanup_expired(pool: &DbPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM password_resets WHERE expires_at <= ?")
            .bind(Utc::now())
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
