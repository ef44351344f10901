//! Route definitions for the web-facing report CRUD.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::reports;
use crate::state::AppState;

/// ```text
/// GET  /reportes                -> index (auth)
/// GET  /reportes/crear          -> creation form
/// POST /reportes                -> create
/// GET  /reportes/{id}           -> detail
/// POST /reportes/{id}           -> update
/// GET  /reportes/{id}/editar    -> edit form
/// POST /reportes/{id}/eliminar  -> delete
/// ```
///
/// `/reportes/crear` is a literal route: the router matches static
/// segments before `{id}` captures, so it is never swallowed as
/// `id = "crear"`. The routing tests pin this down.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reportes", get(reports::index).post(reports::create))
        .route("/reportes/crear", get(reports::create_form))
        .route(
            "/reportes/{id}",
            get(reports::show).post(reports::update),
        )
        .route("/reportes/{id}/editar", get(reports::edit_form))
        .route("/reportes/{id}/eliminar", post(reports::delete))
}
