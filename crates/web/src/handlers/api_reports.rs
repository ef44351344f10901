//! Handlers for the `/api/reportes` resource.
//!
//! Programmatic counterpart of the web CRUD: proper `PUT`/`DELETE` verbs,
//! the `{ success, message, data | errors }` envelope, and field errors on
//! 400 instead of flash-and-redirect. Authentication rides on the same
//! session cookie.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use ecocusco_core::material::{MaterialType, ReportStatus};
use ecocusco_core::validation::validate;
use ecocusco_core::CoreError;
use ecocusco_db::models::report::{CreateReport, ReportFilter, UpdateReport};
use ecocusco_db::repositories::{clamp_page, clamp_per_page, ReportRepo};
use ecocusco_db::unique::SqlUniqueCheck;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::{can_modify, forbid_view, parse_id};
use crate::middleware::auth::AuthUser;
use crate::query::ReportListParams;
use crate::response::ApiResponse;
use crate::state::AppState;

/// JSON body accepted by create and update.
#[derive(Debug, Default, Deserialize)]
pub struct ReportPayload {
    pub tipo_material: Option<String>,
    pub cantidad: Option<f64>,
    pub ubicacion: Option<String>,
    pub descripcion: Option<String>,
    pub urgencia: Option<i64>,
    /// Admin-only status transition.
    pub estado: Option<String>,
}

impl ReportPayload {
    /// Stringify present fields so the JSON body runs through the same
    /// rule engine as the web forms.
    fn as_data(&self) -> HashMap<String, String> {
        let mut data = HashMap::new();
        if let Some(v) = &self.tipo_material {
            data.insert("tipo_material".to_string(), v.clone());
        }
        if let Some(v) = self.cantidad {
            data.insert("cantidad".to_string(), v.to_string());
        }
        if let Some(v) = &self.ubicacion {
            data.insert("ubicacion".to_string(), v.clone());
        }
        if let Some(v) = &self.descripcion {
            data.insert("descripcion".to_string(), v.clone());
        }
        if let Some(v) = self.urgencia {
            data.insert("urgencia".to_string(), v.to_string());
        }
        data
    }
}

/// Validate a payload against the report rules; 400 with field errors on
/// failure.
async fn check_payload(state: &AppState, payload: &ReportPayload) -> AppResult<()> {
    let tipo_rule = format!("required|in:{}", MaterialType::rule_values());
    let rules = [
        ("tipo_material", tipo_rule.as_str()),
        ("cantidad", "required|numeric|min:0.1|max:10000"),
        ("ubicacion", "required|string|min:3|max:200"),
        ("descripcion", "string|max:1000"),
        ("urgencia", "integer|min:1|max:4"),
    ];
    let unique = SqlUniqueCheck::new(&state.pool);
    let outcome = validate(&payload.as_data(), &HashMap::new(), &rules, &unique).await?;
    if !outcome.is_valid() {
        return Err(AppError::Validation(outcome.errors));
    }
    Ok(())
}

/// Fetch a report by raw id segment or produce the 404 envelope.
async fn find_report(
    state: &AppState,
    raw_id: &str,
) -> AppResult<ecocusco_db::models::report::Report> {
    let id = parse_id(raw_id).ok_or(AppError::Core(CoreError::NotFound {
        entity: "reporte",
        id: 0,
    }))?;
    ReportRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "reporte",
            id,
        }))
}

/// GET /api/reportes
pub async fn list(
    State(state): State<AppState>,
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
    Ok(ApiResponse::ok("Reportes obtenidos", pagina))
}

/// POST /api/reportes -- 201 with the created row.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<ReportPayload>,
) -> AppResult<Response> {
    check_payload(&state, &payload).await?;

    let input = CreateReport {
        user_id: auth.user.id,
        tipo_material: payload.tipo_material.unwrap_or_default(),
        cantidad: payload.cantidad.unwrap_or_default(),
        ubicacion: payload.ubicacion.unwrap_or_default().trim().to_string(),
        descripcion: payload
            .descripcion
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()),
        foto: None,
        urgencia: payload.urgencia.unwrap_or(2),
    };
    let report = ReportRepo::create(&state.pool, &input).await?;

    tracing::info!(report_id = report.id, user_id = auth.user.id, "report created via api");
    Ok(ApiResponse::created("Reporte registrado", report))
}

/// GET /api/reportes/{id}
pub async fn show(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(raw_id): Path<String>,
) -> AppResult<Response> {
    let report = find_report(&state, &raw_id).await?;
    forbid_view(&report, &auth.user)?;
    Ok(ApiResponse::ok("Reporte obtenido", report))
}

/// PUT /api/reportes/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(raw_id): Path<String>,
    Json(payload): Json<ReportPayload>,
) -> AppResult<Response> {
    let report = find_report(&state, &raw_id).await?;
    if !can_modify(&report, &auth.user) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Solo puedes editar tus reportes pendientes".to_string(),
        )));
    }

    let is_owner = report.user_id == auth.user.id;
    let mut input = UpdateReport::default();

    if is_owner {
        check_payload(&state, &payload).await?;
        input.tipo_material = payload.tipo_material;
        input.cantidad = payload.cantidad;
        input.ubicacion = payload.ubicacion.map(|v| v.trim().to_string());
        input.descripcion = payload
            .descripcion
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        input.urgencia = payload.urgencia;
    }

    if auth.is_admin() {
        if let Some(estado) = &payload.estado {
            let status = estado.parse::<ReportStatus>().map_err(AppError::Core)?;
            input.estado = Some(status.as_str().to_string());
        }
    }

    let updated = ReportRepo::update(&state.pool, report.id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "reporte",
            id: report.id,
        }))?;

    tracing::info!(report_id = report.id, user_id = auth.user.id, "report updated via api");
    Ok(ApiResponse::ok("Reporte actualizado", updated))
}

/// DELETE /api/reportes/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(raw_id): Path<String>,
) -> AppResult<Response> {
    let report = find_report(&state, &raw_id).await?;
    if report.user_id != auth.user.id && !auth.is_admin() {
        return Err(AppError::Core(CoreError::Forbidden(
            "No puedes eliminar reportes de otros usuarios".to_string(),
        )));
    }

    ReportRepo::delete(&state.pool, report.id).await?;
    if let Some(foto) = &report.foto {
        crate::uploads::delete_photo(&state.config, foto).await;
    }

    tracing::info!(report_id = report.id, user_id = auth.user.id, "report deleted via api");
    Ok(ApiResponse::ok("Reporte eliminado", serde_json::Value::Null))
}
