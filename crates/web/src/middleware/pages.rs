//! HTML error pages for the web surface.
//!
//! Handlers and extractors produce JSON envelope errors (the API contract).
//! On web routes this middleware re-renders 4xx/5xx responses as the 404 or
//! 500 page, keeping one error taxonomy underneath. Redirect-style
//! rejections (auth) are 3xx and pass through untouched.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Response};

use crate::state::AppState;
use crate::views::{base_context, MAIN_LAYOUT};

/// Largest error body we bother inspecting for a message.
const MAX_ERROR_BODY: usize = 64 * 1024;

pub async fn html_error_pages(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let response = next.run(req).await;
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let (_parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(body, MAX_ERROR_BODY)
        .await
        .unwrap_or_default();
    let message = serde_json::from_slice::<serde_json::Value>(&bytes)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_owned));

    render_error_page(&state, status, message)
}

/// Render the themed error page for a status, falling back to plain text
/// if even the template fails.
pub fn render_error_page(
    state: &AppState,
    status: StatusCode,
    message: Option<String>,
) -> Response {
    let view = if status == StatusCode::NOT_FOUND {
        "errores.404"
    } else {
        "errores.500"
    };

    let mut ctx = base_context();
    ctx.insert("titulo", "EcoCusco");
    ctx.insert("status", &status.as_u16());
    // Detail only surfaces in debug mode; production gets the generic page.
    // The full error was already logged where it happened.
    let detail = if state.config.debug { message } else { None };
    ctx.insert("detalle", &detail);

    match state.views.render_with_layout(view, &ctx, MAIN_LAYOUT) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(err) => {
            tracing::error!(%err, "error page rendering failed");
            (
                status,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                Body::from("Ocurrió un error. Inténtalo más tarde."),
            )
                .into_response()
        }
    }
}
