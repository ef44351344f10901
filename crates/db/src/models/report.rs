//! Report entity model, DTOs, and list filtering.

use ecocusco_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full report row from the `reportes` table.
///
/// `cantidad` is kilograms and always decodes as `f64` regardless of how a
/// particular row was written (SQLite REAL column).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Report {
    pub id: DbId,
    pub user_id: DbId,
    pub tipo_material: String,
    pub cantidad: f64,
    pub ubicacion: String,
    pub descripcion: Option<String>,
    pub foto: Option<String>,
    pub urgencia: i64,
    pub estado: String,
    pub fecha_reporte: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a report. `estado` always starts as `pendiente`.
#[derive(Debug, Clone)]
pub struct CreateReport {
    pub user_id: DbId,
    pub tipo_material: String,
    pub cantidad: f64,
    pub ubicacion: String,
    pub descripcion: Option<String>,
    pub foto: Option<String>,
    pub urgencia: i64,
}

/// DTO for updating a report. Only non-`None` fields are applied.
#[derive(Debug, Clone, Default)]
pub struct UpdateReport {
    pub tipo_material: Option<String>,
    pub cantidad: Option<f64>,
    pub ubicacion: Option<String>,
    pub descripcion: Option<String>,
    pub foto: Option<String>,
    pub urgencia: Option<i64>,
    pub estado: Option<String>,
}

/// Equality filters for report listings, `AND`-joined when present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportFilter {
    pub user_id: Option<DbId>,
    pub tipo_material: Option<String>,
    pub estado: Option<String>,
}

/// Per-material aggregate row for statistics queries.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MaterialAggregate {
    pub tipo_material: String,
    pub reportes: i64,
    pub kilos: f64,
}

/// Month bucket (`YYYY-MM`) aggregate row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MonthlyAggregate {
    pub mes: String,
    pub reportes: i64,
    pub kilos: f64,
}

/// Location leaderboard row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LocationAggregate {
    pub ubicacion: String,
    pub reportes: i64,
}

/// Community-wide headline numbers for the home and statistics pages.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct CommunityTotals {
    pub total_reportes: i64,
    pub total_kilos: f64,
    pub total_usuarios: i64,
    pub reportes_resueltos: i64,
}

/// Headline numbers scoped to one user for the dashboard.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct UserTotals {
    pub total_reportes: i64,
    pub total_kilos: f64,
    pub reportes_pendientes: i64,
    pub reportes_resueltos: i64,
}
