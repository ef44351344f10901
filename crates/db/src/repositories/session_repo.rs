//! Repository for the `sesiones` table.

use chrono::Utc;
use ecocusco_core::types::{DbId, Timestamp};

use crate::models::session::{CreateSession, SessionRecord};
use crate::DbPool;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "token_hash, user_id, data, expires_at, created_at, updated_at";

/// Provides storage for server-side sessions, keyed by cookie-token digest.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new session, returning the created row.
    pub async fn create(pool: &DbPool, input: &CreateSession) -> Result<SessionRecord, sqlx::Error> {
        let now = Utc::now();
        let query = format!(
            "INSERT INTO sesiones (token_hash, user_id, data, expires_at, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SessionRecord>(&query)
            .bind(&input.token_hash)
            .bind(input.user_id)
            .bind(&input.data)
            .bind(input.expires_at)
            .bind(now)
            .bind(now)
            .fetch_one(pool)
            .await
    }

    /// Find a session by token digest. Expired rows are treated as absent.
    pub async fn find_active(
        pool: &DbPool,
        token_hash: &str,
    ) -> Result<Option<SessionRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sesiones WHERE token_hash = ? AND expires_at > ?");
        sqlx::query_as::<_, SessionRecord>(&query)
            .bind(token_hash)
            .bind(Utc::now())
            .fetch_optional(pool)
            .await
    }

    /// Persist the mutable parts of a session: owner, data document, and a
    /// refreshed expiry. Returns `true` if the row still existed.
    pub async fn save(
        pool: &DbPool,
        token_hash: &str,
        user_id: Option<DbId>,
        data: &str,
        expires_at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sesiones SET user_id = ?, data = ?, expires_at = ?, updated_at = ?
             WHERE token_hash = ?",
        )
        .bind(user_id)
        .bind(data)
        .bind(expires_at)
        .bind(Utc::now())
        .bind(token_hash)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Destroy a session (logout). Returns `true` if a row was removed.
    pub async fn delete(pool: &DbPool, token_hash: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sesiones WHERE token_hash = ?")
            .bind(token_hash)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Sweep expired rows. Returns the count of deleted sessions.
    pub async fn cleanup_expired(pool: &DbPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sesiones WHERE expires_at <= ?")
            .bind(Utc::now())
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
