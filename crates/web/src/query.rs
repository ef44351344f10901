//! Shared query parameter types for handlers.

use serde::Deserialize;

/// Parameters accepted by the report listings, web and API alike
/// (`?page=&per_page=&tipo_material=&estado=`).
///
/// Page values are clamped in the repository layer via `clamp_page` /
/// `clamp_per_page`, so out-of-range input degrades instead of erroring.
/// Empty filter strings mean "no filter".
#[derive(Debug, Default, Deserialize)]
pub struct ReportListParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub tipo_material: Option<String>,
    pub estado: Option<String>,
}
