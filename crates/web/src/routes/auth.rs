//! Route definitions for the session lifecycle.

use axum::routing::get;
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// ```text
/// GET|POST /login     -> form / authenticate
/// GET|POST /register  -> form / create account
/// GET|POST /logout    -> confirm / destroy session
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/register", get(auth::register_form).post(auth::register))
        .route("/logout", get(auth::logout_form).post(auth::logout))
}
