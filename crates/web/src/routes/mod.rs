//! Route registration.
//!
//! Route hierarchy:
//!
//! ```text
//! /health                         liveness + DB ping
//!
//! /                               home with community stats
//! /login  /register  /logout      session lifecycle (GET form, POST action)
//! /forgot-password                issue a reset token
//! /reset-password/{token}         consume a reset token
//! /dashboard                      personal stats (auth)
//! /estadisticas                   community stats page
//!
//! /reportes                       list (GET, auth), create (POST)
//! /reportes/crear                 creation form -- registered as a literal
//!                                 route, so it can never be captured as
//!                                 an {id}
//! /reportes/{id}                  detail (GET), update (POST)
//! /reportes/{id}/editar           edit form
//! /reportes/{id}/eliminar         delete (POST)
//!
//! /api/reportes                   list (GET), create (POST 201)
//! /api/reportes/{id}              show (GET), update (PUT), delete (DELETE)
//! /api/estadisticas/datos         aggregate numbers
//! /api/estadisticas/graficos      chart series
//! ```
//!
//! Web mutations are POSTs guarded by the session CSRF token; the `/api`
//! family uses proper verbs and the JSON envelope.

pub mod api;
pub mod auth;
pub mod health;
pub mod pages;
pub mod password;
pub mod reports;

use axum::extract::Request;
use axum::Router;

use crate::error::AppError;
use crate::state::AppState;

/// All web (HTML) routes, with the HTML 404 fallback.
pub fn web_routes() -> Router<AppState> {
    Router::new()
        .merge(pages::router())
        .merge(auth::router())
        .merge(password::router())
        .merge(reports::router())
        .fallback(not_found)
}

/// The `/api` route tree, with the JSON 404 fallback.
pub fn api_routes() -> Router<AppState> {
    api::router().fallback(not_found)
}

/// Router-level 404. The JSON envelope it produces is re-rendered as the
/// HTML 404 page by the page-error middleware on web paths.
async fn not_found(req: Request) -> AppError {
    AppError::RouteNotFound(req.uri().path().to_string())
}
