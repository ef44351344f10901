//! Route definitions for the `/api` surface (mounted under `/api`).

use axum::routing::get;
use axum::Router;

use crate::handlers::{api_reports, stats};
use crate::state::AppState;

/// ```text
/// GET    /reportes               -> paginated list
/// POST   /reportes               -> create (201)
/// GET    /reportes/{id}          -> detail
/// PUT    /reportes/{id}          -> update
/// DELETE /reportes/{id}          -> delete
/// GET    /estadisticas/datos     -> aggregate numbers
/// GET    /estadisticas/graficos  -> chart series
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/reportes",
            get(api_reports::list).post(api_reports::create),
        )
        .route(
            "/reportes/{id}",
            get(api_reports::show)
                .put(api_reports::update)
                .delete(api_reports::delete),
        )
        .route("/estadisticas/datos", get(stats::datos))
        .route("/estadisticas/graficos", get(stats::graficos))
}
