//! HTTP handlers.
//!
//! Web handlers render tera pages and converse in flashes + redirects;
//! `/api` handlers speak the JSON envelope. Both sit on the same
//! repositories and the same validation engine.

pub mod api_reports;
pub mod auth;
pub mod dashboard;
pub mod home;
pub mod password;
pub mod reports;
pub mod stats;

use std::collections::HashMap;

use axum::extract::multipart::Multipart;
use axum::response::{Html, IntoResponse, Redirect, Response};
use ecocusco_core::types::DbId;
use ecocusco_core::validation::FileMeta;
use ecocusco_core::CoreError;
use ecocusco_db::models::report::Report;
use ecocusco_db::models::user::User;
use tera::Context;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::session::{Session, CSRF_FIELD};
use crate::state::AppState;
use crate::uploads::UploadedFile;
use crate::views::MAIN_LAYOUT;

/// Render a full page wrapped in the main layout.
pub fn page(state: &AppState, ctx: &mut Context, view: &str, titulo: &str) -> AppResult<Response> {
    ctx.insert("titulo", titulo);
    let html = state.views.render_with_layout(view, ctx, MAIN_LAYOUT)?;
    Ok(Html(html).into_response())
}

/// CSRF gate for state-changing web forms.
///
/// A missing or mismatched token never applies the mutation: the user gets
/// a flash and bounces back to `back`.
pub fn csrf_guard(session: &Session, submitted: Option<&str>, back: &str) -> Result<(), Response> {
    if session.verify_csrf(submitted.unwrap_or_default()) {
        return Ok(());
    }
    tracing::warn!(back, "CSRF token mismatch");
    session.flash("error", "Token de seguridad inválido. Inténtalo de nuevo.");
    Err(Redirect::to(back).into_response())
}

/// Submitted form input minus secrets, for the `old()` re-render helper.
pub fn sanitized_old(fields: &HashMap<String, String>) -> HashMap<String, String> {
    fields
        .iter()
        .filter(|(k, _)| !matches!(k.as_str(), CSRF_FIELD | "password" | "password_confirmation"))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Route parameters are matched as raw segments (`[^/]+`); a non-numeric id
/// is simply an id that matches nothing.
pub fn parse_id(raw: &str) -> Option<DbId> {
    raw.parse::<DbId>().ok().filter(|id| *id > 0)
}

/// Fields plus uploaded files pulled out of a multipart form body.
pub struct FormPayload {
    pub fields: HashMap<String, String>,
    pub files: HashMap<String, UploadedFile>,
}

impl FormPayload {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }
}

/// Drain a multipart body into text fields and buffered files.
///
/// File parts without a client filename are treated as empty inputs and
/// skipped, matching how browsers submit an untouched `<input type=file>`.
pub async fn read_multipart(
    mut multipart: Multipart,
    config: &AppConfig,
) -> AppResult<FormPayload> {
    let mut fields = HashMap::new();
    let mut files = HashMap::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::BadRequest(format!("formulario inválido: {err}")))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        let file_name = field.file_name().map(str::to_owned).filter(|f| !f.is_empty());

        match file_name {
            Some(original_name) => {
                let content_type = field.content_type().map(str::to_owned);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| AppError::BadRequest(format!("carga inválida: {err}")))?;
                let meta = FileMeta {
                    original_name,
                    size_bytes: bytes.len() as u64,
                    content_type,
                    max_bytes: Some(config.max_upload_bytes),
                };
                files.insert(name, UploadedFile {
                    meta,
                    bytes: bytes.to_vec(),
                });
            }
            None => {
                let value = field
                    .text()
                    .await
                    .map_err(|err| AppError::BadRequest(format!("formulario inválido: {err}")))?;
                fields.insert(name, value);
            }
        }
    }

    Ok(FormPayload { fields, files })
}

// ---------------------------------------------------------------------------
// Report authorization
// ---------------------------------------------------------------------------

/// Owners and admins may look at a report.
pub fn can_view(report: &Report, user: &User) -> bool {
    report.user_id == user.id || user.is_admin
}

/// Owners may change a report while it is still pending; admins always.
pub fn can_modify(report: &Report, user: &User) -> bool {
    user.is_admin || (report.user_id == user.id && report.estado == "pendiente")
}

/// API-side authorization errors.
pub fn forbid_view(report: &Report, user: &User) -> Result<(), AppError> {
    if can_view(report, user) {
        return Ok(());
    }
    Err(AppError::Core(CoreError::Forbidden(
        "No tienes acceso a este reporte".to_string(),
    )))
}
