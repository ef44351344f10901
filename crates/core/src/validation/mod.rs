//! Declarative field validation.
//!
//! Rules are authored as pipe-separated strings (`"required|email|max:150"`),
//! parsed once into typed [`Rule`] variants, and evaluated against the raw
//! request data. The engine itself is pure: database lookups (`unique:`) go
//! through the injected [`UniqueCheck`] capability, and uploaded files are
//! described by [`FileMeta`] values supplied by the transport layer.

pub mod evaluator;
pub mod rules;

use std::future::Future;

use crate::error::CoreError;

pub use evaluator::{validate, ValidationOutcome};
pub use rules::{parse_rules, Rule};

/// Capability for the `unique:` rule: does a row already exist with this
/// value in the given column?
///
/// Implementations must restrict `table`/`column` to an allow-list; the
/// validator passes them through verbatim from rule strings.
pub trait UniqueCheck {
    fn exists(
        &self,
        table: &str,
        column: &str,
        value: &str,
    ) -> impl Future<Output = Result<bool, CoreError>> + Send;
}

/// A [`UniqueCheck`] that reports every value as free. Used when a rule set
/// carries no `unique:` rule and in unit tests.
pub struct NoUniqueCheck;

impl UniqueCheck for NoUniqueCheck {
    async fn exists(&self, _: &str, _: &str, _: &str) -> Result<bool, CoreError> {
        Ok(false)
    }
}

/// Description of an uploaded file, as seen by the `file`/`image` rules.
#[derive(Debug, Clone)]
pub struct FileMeta {
    /// Client-supplied filename (used for the extension check only).
    pub original_name: String,
    pub size_bytes: u64,
    pub content_type: Option<String>,
    /// Upper size bound from configuration; `None` disables the check.
    pub max_bytes: Option<u64>,
}

impl FileMeta {
    /// Lowercased filename extension, without the dot.
    pub fn extension(&self) -> Option<String> {
        let (_, ext) = self.original_name.rsplit_once('.')?;
        if ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_lowercased() {
        let meta = FileMeta {
            original_name: "Foto.JPG".into(),
            size_bytes: 10,
            content_type: None,
            max_bytes: None,
        };
        assert_eq!(meta.extension().as_deref(), Some("jpg"));
    }

    #[test]
    fn extension_absent_when_no_dot() {
        let meta = FileMeta {
            original_name: "archivo".into(),
            size_bytes: 10,
            content_type: None,
            max_bytes: None,
        };
        assert_eq!(meta.extension(), None);
    }
}
