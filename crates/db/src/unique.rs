//! Database-backed implementation of the validator's `unique:` capability.

use ecocusco_core::validation::UniqueCheck;
use ecocusco_core::CoreError;

use crate::DbPool;

/// (table, column) pairs the `unique:` rule may query. Rule strings are
/// author-controlled, but the allow-list keeps identifier interpolation
/// provably closed.
const ALLOWED: [(&str, &str); 1] = [("usuarios", "email")];

/// Answers `exists(table, column, value)` for the validation engine.
pub struct SqlUniqueCheck<'a> {
    pool: &'a DbPool,
}

impl<'a> SqlUniqueCheck<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        SqlUniqueCheck { pool }
    }
}

impl UniqueCheck for SqlUniqueCheck<'_> {
    async fn exists(&self, table: &str, column: &str, value: &str) -> Result<bool, CoreError> {
        if !ALLOWED.contains(&(table, column)) {
            return Err(CoreError::Internal(format!(
                "unique check not permitted for {table}.{column}"
            )));
        }

        let query = format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE {column} = ?)");
        let exists: bool = sqlx::query_scalar(&query)
            .bind(value)
            .fetch_one(self.pool)
            .await
            .map_err(|err| {
                tracing::error!(%err, table, column, "unique check query failed");
                CoreError::Internal("no se pudo verificar la unicidad".into())
            })?;
        Ok(exists)
    }
}
