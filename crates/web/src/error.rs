use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ecocusco_core::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// `IntoResponse` produces the project's JSON envelope
/// (`{ success: false, message, errors? }`); web routes re-render error
/// responses as HTML pages through the page-error middleware.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `ecocusco_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Field-scoped validation failures, surfaced as a 400 with `errors`.
    #[error("Validation failed")]
    Validation(BTreeMap<String, Vec<String>>),

    /// A template rendering failure.
    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Router-level 404 for paths no route matched.
    #[error("Not found: {0}")]
    RouteNotFound(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    format!("{entity} con id {id} no existe"),
                    None,
                ),
                CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone(), None),
                CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone(), None),
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone(), None),
                CoreError::Expired(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal()
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- Validation failures carry the field->messages map ---
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "Los datos enviados no son válidos".to_string(),
                Some(errors.clone()),
            ),

            // --- Template failures are always internal ---
            AppError::Template(err) => {
                tracing::error!(error = %err, "Template rendering failed");
                internal()
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::RouteNotFound(path) => (
                StatusCode::NOT_FOUND,
                format!("No existe la ruta {path}"),
                None,
            ),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let mut body = json!({
            "success": false,
            "message": message,
        });
        if let Some(errors) = errors {
            body["errors"] = json!(errors);
        }

        (status, Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, String, Option<BTreeMap<String, Vec<String>>>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Ocurrió un error interno. Inténtalo más tarde.".to_string(),
        None,
    )
}

/// Classify a sqlx error into a status, message, and optional field errors.
///
/// - `RowNotFound` maps to 404.
/// - Unique-constraint violations map to 409 (SQLite reports them through
///   the backend-independent `ErrorKind`).
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(
    err: &sqlx::Error,
) -> (StatusCode, String, Option<BTreeMap<String, Vec<String>>>) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "Recurso no encontrado".to_string(),
            None,
        ),
        sqlx::Error::Database(db_err) => {
            if db_err.kind() == sqlx::error::ErrorKind::UniqueViolation {
                return (
                    StatusCode::CONFLICT,
                    "El valor ya está registrado".to_string(),
                    None,
                );
            }
            tracing::error!(error = %db_err, "Database error");
            internal()
        }
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}

/// `true` when a sqlx error is a unique-constraint violation. Handlers use
/// this to turn a duplicate registration into a domain conflict.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err)
        if db_err.kind() == sqlx::error::ErrorKind::UniqueViolation)
}
