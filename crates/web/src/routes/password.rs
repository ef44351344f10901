//! Route definitions for the forgot/reset password flow.

use axum::routing::get;
use axum::Router;

use crate::handlers::password;
use crate::state::AppState;

/// ```text
/// GET|POST /forgot-password         -> form / issue token
/// GET|POST /reset-password/{token}  -> form / consume token
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/forgot-password",
            get(password::forgot_form).post(password::forgot),
        )
        .route(
            "/reset-password/{token}",
            get(password::reset_form).post(password::reset),
        )
}
