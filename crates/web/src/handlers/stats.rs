//! Handlers for community statistics: the HTML page and the chart JSON.

use axum::extract::State;
use axum::response::Response;
use ecocusco_db::repositories::ReportRepo;
use serde_json::json;

use crate::error::AppResult;
use crate::handlers::page;
use crate::middleware::auth::OptionalUser;
use crate::response::ApiResponse;
use crate::session::Session;
use crate::state::AppState;
use crate::views::page_context;

const TOP_LOCATIONS: i64 = 5;

/// GET /estadisticas -- public page with community aggregates.
pub async fn estadisticas(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
) -> AppResult<Response> {
    let totales = ReportRepo::community_totals(&state.pool).await?;
    let materiales = ReportRepo::by_material(&state.pool, None).await?;
    let ubicaciones = ReportRepo::top_locations(&state.pool, TOP_LOCATIONS).await?;

    let mut ctx = page_context(&session, user.as_ref());
    ctx.insert("totales", &totales);
    ctx.insert("materiales", &materiales);
    ctx.insert("ubicaciones", &ubicaciones);
    page(&state, &mut ctx, "estadisticas", "Estadísticas")
}

/// GET /api/estadisticas/datos -- raw aggregate numbers.
pub async fn datos(State(state): State<AppState>) -> AppResult<Response> {
    let totales = ReportRepo::community_totals(&state.pool).await?;
    let materiales = ReportRepo::by_material(&state.pool, None).await?;
    let ubicaciones = ReportRepo::top_locations(&state.pool, TOP_LOCATIONS).await?;

    Ok(ApiResponse::ok(
        "Estadísticas obtenidas",
        json!({
            "totales": totales,
            "materiales": materiales,
            "ubicaciones": ubicaciones,
        }),
    ))
}

/// GET /api/estadisticas/graficos -- label/series arrays ready for charts.
pub async fn graficos(State(state): State<AppState>) -> AppResult<Response> {
    let materiales = ReportRepo::by_material(&state.pool, None).await?;
    let mensual = ReportRepo::monthly_series(&state.pool).await?;

    let data = json!({
        "materiales": {
            "labels": materiales.iter().map(|m| m.tipo_material.clone()).collect::<Vec<_>>(),
            "kilos": materiales.iter().map(|m| m.kilos).collect::<Vec<_>>(),
            "reportes": materiales.iter().map(|m| m.reportes).collect::<Vec<_>>(),
        },
        "mensual": {
            "labels": mensual.iter().map(|m| m.mes.clone()).collect::<Vec<_>>(),
            "kilos": mensual.iter().map(|m| m.kilos).collect::<Vec<_>>(),
            "reportes": mensual.iter().map(|m| m.reportes).collect::<Vec<_>>(),
        },
    });
    Ok(ApiResponse::ok("Series para gráficos", data))
}
