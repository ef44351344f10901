//! Session-based authentication extractors for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde_json::json;

use ecocusco_db::models::user::User;
use ecocusco_db::repositories::UserRepo;

use crate::session::Session;
use crate::state::AppState;

/// Authenticated user resolved from the session cookie.
///
/// Use this as an extractor parameter in any handler that requires
/// authentication:
///
/// ```ignore
/// async fn my_handler(auth: AuthUser) -> AppResult<Response> {
///     tracing::info!(user_id = auth.user.id, "handling request");
///     ...
/// }
/// ```
///
/// Unauthenticated requests are redirected to `/login` on web paths and get
/// a 401 JSON envelope under `/api` (path-prefix detection).
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.user.is_admin
    }
}

/// Rejection that speaks HTML or JSON depending on the request surface.
pub struct AuthRejection {
    wants_json: bool,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        if self.wants_json {
            let body = json!({
                "success": false,
                "message": "Debes iniciar sesión",
            });
            (StatusCode::UNAUTHORIZED, Json(body)).into_response()
        } else {
            Redirect::to("/login").into_response()
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let wants_json = parts.uri.path().starts_with("/api");

        let session = parts.extensions.get::<Session>().cloned();
        let reject = |session: Option<&Session>| {
            if let (false, Some(session)) = (wants_json, session) {
                session.flash("error", "Debes iniciar sesión para continuar.");
            }
            AuthRejection { wants_json }
        };

        let session = match session {
            Some(session) => session,
            None => return Err(AuthRejection { wants_json }),
        };

        let user_id = match session.user_id() {
            Some(id) => id,
            None => return Err(reject(Some(&session))),
        };

        // The session only caches the id + name snapshot; the row is the
        // source of truth (a deleted account invalidates the session).
        match UserRepo::find_by_id(&state.pool, user_id).await {
            Ok(Some(user)) => Ok(AuthUser { user }),
            Ok(None) => {
                session.logout();
                Err(reject(Some(&session)))
            }
            Err(err) => {
                tracing::error!(%err, user_id, "auth lookup failed");
                Err(reject(Some(&session)))
            }
        }
    }
}

/// Like [`AuthUser`] but never rejects; anonymous visitors get `None`.
/// Used by pages with mixed audiences (home, statistics).
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<User>);

impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(session) = parts.extensions.get::<Session>().cloned() else {
            return Ok(OptionalUser(None));
        };
        let Some(user_id) = session.user_id() else {
            return Ok(OptionalUser(None));
        };
        match UserRepo::find_by_id(&state.pool, user_id).await {
            Ok(user) => Ok(OptionalUser(user)),
            Err(err) => {
                tracing::error!(%err, user_id, "optional auth lookup failed");
                Ok(OptionalUser(None))
            }
        }
    }
}
