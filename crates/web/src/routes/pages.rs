//! Route definitions for standalone pages.

use axum::routing::get;
use axum::Router;

use crate::handlers::{dashboard, home, stats};
use crate::state::AppState;

/// ```text
/// GET /              -> home (public)
/// GET /dashboard     -> personal stats (auth)
/// GET /estadisticas  -> community stats (public)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/dashboard", get(dashboard::dashboard))
        .route("/estadisticas", get(stats::estadisticas))
}
