//! Handlers for the web-facing report CRUD.
//!
//! Every mutation here is a CSRF-guarded POST (the HTML form surface);
//! the `/api` family in [`super::api_reports`] exposes the same operations
//! with proper verbs for JSON clients.

use std::collections::HashMap;

use axum::extract::multipart::Multipart;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use ecocusco_core::material::{urgency_label, MaterialType, ReportStatus, URGENCY_MAX, URGENCY_MIN};
use ecocusco_core::validation::validate;
use ecocusco_db::models::report::{CreateReport, ReportFilter, UpdateReport};
use ecocusco_db::repositories::{clamp_page, clamp_per_page, ReportRepo};
use ecocusco_db::unique::SqlUniqueCheck;
use serde_json::json;

use crate::error::AppResult;
use crate::handlers::{
    can_modify, can_view, csrf_guard, page, parse_id, read_multipart, sanitized_old, FormPayload,
};
use crate::middleware::auth::AuthUser;
use crate::query::ReportListParams;
use crate::session::{Session, CSRF_FIELD};
use crate::state::AppState;
use crate::uploads;
use crate::views::page_context;

/// Validation rules shared by create and owner-edit.
fn report_rules() -> Vec<(&'static str, String)> {
    vec![
        (
            "tipo_material",
            format!("required|in:{}", MaterialType::rule_values()),
        ),
        ("cantidad", "required|numeric|min:0.1|max:10000".to_string()),
        ("ubicacion", "required|string|min:3|max:200".to_string()),
        ("descripcion", "string|max:1000".to_string()),
        ("urgencia", "integer|min:1|max:4".to_string()),
        ("foto", "image".to_string()),
    ]
}

/// Material choices for the form selects.
fn material_options() -> Vec<serde_json::Value> {
    MaterialType::ALL
        .iter()
        .map(|m| json!({ "value": m.as_str(), "label": m.label() }))
        .collect()
}

fn urgency_options() -> Vec<serde_json::Value> {
    (URGENCY_MIN..=URGENCY_MAX)
        .map(|u| json!({ "value": u, "label": urgency_label(u) }))
        .collect()
}

fn status_options() -> Vec<serde_json::Value> {
    ReportStatus::ALL
        .iter()
        .map(|s| json!({ "value": s.as_str(), "label": s.label() }))
        .collect()
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// GET /reportes -- the authenticated user's reports, paginated. Admins see
/// every report and may filter by material and status.
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    auth: AuthUser,
    Query(params): Query<ReportListParams>,
) -> AppResult<Response> {
    let filter = ReportFilter {
        user_id: (!auth.is_admin()).then_some(auth.user.id),
        tipo_material: params.tipo_material.filter(|v| !v.is_empty()),
        estado: params.estado.filter(|v| !v.is_empty()),
    };
    let pagina = ReportRepo::paginate(
        &state.pool,
        &filter,
        clamp_page(params.page),
        clamp_per_page(params.per_page),
    )
    .await?;

    let mut ctx = page_context(&session, Some(&auth.user));
    ctx.insert("pagina", &pagina);
    ctx.insert("materiales", &material_options());
    ctx.insert("estados", &status_options());
    ctx.insert("filtro_tipo", &filter.tipo_material);
    ctx.insert("filtro_estado", &filter.estado);
    page(&state, &mut ctx, "reportes.index", "Mis reportes")
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// GET /reportes/crear
pub async fn create_form(
    State(state): State<AppState>,
    session: Session,
    auth: AuthUser,
) -> AppResult<Response> {
    let mut ctx = page_context(&session, Some(&auth.user));
    ctx.insert("materiales", &material_options());
    ctx.insert("urgencias", &urgency_options());
    page(&state, &mut ctx, "reportes.crear", "Nuevo reporte")
}

/// POST /reportes -- multipart because of the optional photo.
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    auth: AuthUser,
    multipart: Multipart,
) -> AppResult<Response> {
    let payload = read_multipart(multipart, &state.config).await?;
    if let Err(response) = csrf_guard(&session, payload.get(CSRF_FIELD), "/reportes/crear") {
        return Ok(response);
    }

    if let Some(errors) = validate_report(&state, &payload).await? {
        session.remember_form(errors, sanitized_old(&payload.fields));
        return Ok(Redirect::to("/reportes/crear").into_response());
    }

    let foto = match payload.files.get("foto") {
        Some(upload) => Some(uploads::save_photo(&state.config, upload).await?),
        None => None,
    };

    let input = CreateReport {
        user_id: auth.user.id,
        tipo_material: payload.get("tipo_material").unwrap_or_default().to_string(),
        cantidad: payload
            .get("cantidad")
            .and_then(|v| v.parse().ok())
            .unwrap_or_default(),
        ubicacion: payload.get("ubicacion").unwrap_or_default().trim().to_string(),
        descripcion: payload
            .get("descripcion")
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_owned),
        foto,
        urgencia: payload
            .get("urgencia")
            .and_then(|v| v.parse().ok())
            .unwrap_or(2),
    };
    let report = ReportRepo::create(&state.pool, &input).await?;

    tracing::info!(report_id = report.id, user_id = auth.user.id, "report created");
    session.flash("success", "Reporte registrado. ¡Gracias por tu aporte!");
    Ok(Redirect::to("/reportes").into_response())
}

/// Run the report rules; `Ok(Some(errors))` means the submission is bad.
async fn validate_report(
    state: &AppState,
    payload: &FormPayload,
) -> AppResult<Option<std::collections::BTreeMap<String, Vec<String>>>> {
    let owned = report_rules();
    let rules: Vec<(&str, &str)> = owned.iter().map(|(f, s)| (*f, s.as_str())).collect();
    let files: HashMap<String, _> = payload
        .files
        .iter()
        .map(|(k, v)| (k.clone(), v.meta.clone()))
        .collect();

    let unique = SqlUniqueCheck::new(&state.pool);
    let outcome = validate(&payload.fields, &files, &rules, &unique).await?;
    Ok((!outcome.is_valid()).then_some(outcome.errors))
}

// ---------------------------------------------------------------------------
// Detail / edit / delete
// ---------------------------------------------------------------------------

/// Shared "fetch or bounce to the list with a flash" lookup.
async fn find_or_flash(
    state: &AppState,
    session: &Session,
    raw_id: &str,
) -> AppResult<Result<ecocusco_db::models::report::Report, Response>> {
    let report = match parse_id(raw_id) {
        Some(id) => ReportRepo::find_by_id(&state.pool, id).await?,
        None => None,
    };
    match report {
        Some(report) => Ok(Ok(report)),
        None => {
            session.flash("error", "Reporte no encontrado.");
            Ok(Err(Redirect::to("/reportes").into_response()))
        }
    }
}

/// GET /reportes/{id}
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    auth: AuthUser,
    Path(raw_id): Path<String>,
) -> AppResult<Response> {
    let report = match find_or_flash(&state, &session, &raw_id).await? {
        Ok(report) => report,
        Err(response) => return Ok(response),
    };
    if !can_view(&report, &auth.user) {
        session.flash("error", "No tienes acceso a ese reporte.");
        return Ok(Redirect::to("/reportes").into_response());
    }

    let mut ctx = page_context(&session, Some(&auth.user));
    ctx.insert("reporte", &report);
    ctx.insert("urgencia_label", urgency_label(report.urgencia));
    ctx.insert("puede_editar", &can_modify(&report, &auth.user));
    page(&state, &mut ctx, "reportes.show", "Detalle del reporte")
}

/// GET /reportes/{id}/editar
pub async fn edit_form(
    State(state): State<AppState>,
    session: Session,
    auth: AuthUser,
    Path(raw_id): Path<String>,
) -> AppResult<Response> {
    let report = match find_or_flash(&state, &session, &raw_id).await? {
        Ok(report) => report,
        Err(response) => return Ok(response),
    };
    if !can_modify(&report, &auth.user) {
        session.flash("error", "Solo puedes editar tus reportes pendientes.");
        return Ok(Redirect::to("/reportes").into_response());
    }

    let mut ctx = page_context(&session, Some(&auth.user));
    ctx.insert("reporte", &report);
    ctx.insert("materiales", &material_options());
    ctx.insert("urgencias", &urgency_options());
    ctx.insert("estados", &status_options());
    page(&state, &mut ctx, "reportes.editar", "Editar reporte")
}

/// POST /reportes/{id} -- owner edit while pending; admins may also move
/// `estado`.
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    auth: AuthUser,
    Path(raw_id): Path<String>,
    multipart: Multipart,
) -> AppResult<Response> {
    let payload = read_multipart(multipart, &state.config).await?;
    let report = match find_or_flash(&state, &session, &raw_id).await? {
        Ok(report) => report,
        Err(response) => return Ok(response),
    };
    let back = format!("/reportes/{}/editar", report.id);
    if let Err(response) = csrf_guard(&session, payload.get(CSRF_FIELD), &back) {
        return Ok(response);
    }
    if !can_modify(&report, &auth.user) {
        session.flash("error", "Solo puedes editar tus reportes pendientes.");
        return Ok(Redirect::to("/reportes").into_response());
    }

    let is_owner = report.user_id == auth.user.id;
    let mut input = UpdateReport::default();

    if is_owner {
        if let Some(errors) = validate_report(&state, &payload).await? {
            session.remember_form(errors, sanitized_old(&payload.fields));
            return Ok(Redirect::to(&back).into_response());
        }
        input.tipo_material = payload.get("tipo_material").map(str::to_owned);
        input.cantidad = payload.get("cantidad").and_then(|v| v.parse().ok());
        input.ubicacion = payload.get("ubicacion").map(|v| v.trim().to_string());
        input.descripcion = payload
            .get("descripcion")
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_owned);
        input.urgencia = payload.get("urgencia").and_then(|v| v.parse().ok());

        if let Some(upload) = payload.files.get("foto") {
            let filename = uploads::save_photo(&state.config, upload).await?;
            if let Some(old) = &report.foto {
                uploads::delete_photo(&state.config, old).await;
            }
            input.foto = Some(filename);
        }
    }

    if auth.is_admin() {
        if let Some(estado) = payload.get("estado") {
            match estado.parse::<ReportStatus>() {
                Ok(status) => input.estado = Some(status.as_str().to_string()),
                Err(_) => {
                    session.flash("error", "Estado no válido.");
                    return Ok(Redirect::to(&back).into_response());
                }
            }
        }
    }

    ReportRepo::update(&state.pool, report.id, &input).await?;
    tracing::info!(report_id = report.id, user_id = auth.user.id, "report updated");
    session.flash("success", "Reporte actualizado.");
    Ok(Redirect::to(&format!("/reportes/{}", report.id)).into_response())
}

/// POST /reportes/{id}/eliminar -- removes the row and its photo file.
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    auth: AuthUser,
    Path(raw_id): Path<String>,
    axum::Form(form): axum::Form<HashMap<String, String>>,
) -> AppResult<Response> {
    let report = match find_or_flash(&state, &session, &raw_id).await? {
        Ok(report) => report,
        Err(response) => return Ok(response),
    };
    if let Err(response) = csrf_guard(&session, form.get(CSRF_FIELD).map(String::as_str), "/reportes")
    {
        return Ok(response);
    }
    if report.user_id != auth.user.id && !auth.is_admin() {
        session.flash("error", "No puedes eliminar reportes de otros vecinos.");
        return Ok(Redirect::to("/reportes").into_response());
    }

    ReportRepo::delete(&state.pool, report.id).await?;
    if let Some(foto) = &report.foto {
        uploads::delete_photo(&state.config, foto).await;
    }

    tracing::info!(report_id = report.id, user_id = auth.user.id, "report deleted");
    session.flash("success", "Reporte eliminado.");
    Ok(Redirect::to("/reportes").into_response())
}
