//! Server-side cookie sessions.
//!
//! Each browser gets an opaque random token in the `ecocusco_session`
//! cookie; only the SHA-256 digest of that token is stored, as the primary
//! key of the `sesiones` table. The row's `data` column is a JSON document
//! holding the CSRF token, a cached user-name snapshot, flash messages,
//! stored validation errors, and old form input.
//!
//! The [`session_middleware`] loads (or mints) the session before the
//! handler runs, exposes it through request extensions, and persists it
//! afterwards with a sliding expiry. Login and logout rotate the token, so
//! a pre-authentication cookie value never names an authenticated session.
//!
//! Flash messages, stored errors, and old input are one-shot: `take_*`
//! removes them, and the removal is persisted when the request completes.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use chrono::{Duration, Utc};
use ecocusco_core::types::DbId;
use serde::{Deserialize, Serialize};

use ecocusco_db::models::session::{CreateSession, SessionRecord};
use ecocusco_db::repositories::SessionRepo;

use crate::auth::token::{generate_token, hash_token, tokens_match};
use crate::error::AppError;
use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "ecocusco_session";

/// Name of the hidden form field carrying the CSRF token.
pub const CSRF_FIELD: &str = "_token";

/// A one-shot notice (`kind` is `success`, `error`, or `info`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flash {
    pub kind: String,
    pub message: String,
}

/// The JSON document stored in `sesiones.data`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default)]
    pub csrf_token: String,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub flashes: Vec<Flash>,
    #[serde(default)]
    pub errors: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub old_input: HashMap<String, String>,
}

#[derive(Debug)]
struct SessionInner {
    /// Plaintext cookie token; only its digest ever reaches the database.
    token: String,
    user_id: Option<DbId>,
    data: SessionData,
    /// Row not persisted yet; triggers an INSERT plus a `Set-Cookie`.
    is_new: bool,
    /// Digest of a replaced row to delete (token rotation).
    stale_hash: Option<String>,
}

/// Shared per-request session handle.
///
/// Cloneable; the middleware and the handler observe the same state. The
/// inner mutex is never held across an await point.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Mutex<SessionInner>>,
}

impl Session {
    /// Fresh anonymous session with a newly minted CSRF token.
    fn anonymous() -> Self {
        Session {
            inner: Arc::new(Mutex::new(SessionInner {
                token: generate_token(),
                user_id: None,
                data: SessionData {
                    csrf_token: generate_token(),
                    ..SessionData::default()
                },
                is_new: true,
                stale_hash: None,
            })),
        }
    }

    /// Rehydrate from a stored row. A corrupt data document degrades to a
    /// fresh one rather than failing the request.
    fn from_record(token: String, record: SessionRecord) -> Self {
        let mut data: SessionData = serde_json::from_str(&record.data).unwrap_or_else(|err| {
            tracing::warn!(%err, "corrupt session data document, resetting");
            SessionData::default()
        });
        if data.csrf_token.is_empty() {
            data.csrf_token = generate_token();
        }
        Session {
            inner: Arc::new(Mutex::new(SessionInner {
                token,
                user_id: record.user_id,
                data,
                is_new: false,
                stale_hash: None,
            })),
        }
    }

    pub fn user_id(&self) -> Option<DbId> {
        self.inner.lock().unwrap().user_id
    }

    /// Cached display-name snapshot for templates.
    pub fn user_name(&self) -> Option<String> {
        self.inner.lock().unwrap().data.user_name.clone()
    }

    pub fn csrf_token(&self) -> String {
        self.inner.lock().unwrap().data.csrf_token.clone()
    }

    /// Compare a submitted CSRF token against the session's.
    ///
    /// The same token stays valid until the session rotates (login/logout);
    /// within-session reuse is the documented contract.
    pub fn verify_csrf(&self, submitted: &str) -> bool {
        let expected = self.csrf_token();
        !submitted.is_empty() && tokens_match(&expected, submitted)
    }

    /// Authenticate this session: rotate the token, regenerate the CSRF
    /// token, and record the user id and name snapshot.
    pub fn login(&self, user_id: DbId, user_name: &str) {
        let mut inner = self.inner.lock().unwrap();
        if !inner.is_new {
            inner.stale_hash = Some(hash_token(&inner.token));
        }
        inner.token = generate_token();
        inner.is_new = true;
        inner.user_id = Some(user_id);
        inner.data.csrf_token = generate_token();
        inner.data.user_name = Some(user_name.to_string());
    }

    /// Drop authentication: rotate to a fresh anonymous session so the old
    /// cookie value is dead, while keeping the handle usable for a goodbye
    /// flash on the very next page.
    pub fn logout(&self) {
        let mut inner = self.inner.lock().unwrap();
        if !inner.is_new {
            inner.stale_hash = Some(hash_token(&inner.token));
        }
        inner.token = generate_token();
        inner.is_new = true;
        inner.user_id = None;
        inner.data = SessionData {
            csrf_token: generate_token(),
            ..SessionData::default()
        };
    }

    pub fn flash(&self, kind: &str, message: impl Into<String>) {
        self.inner.lock().unwrap().data.flashes.push(Flash {
            kind: kind.to_string(),
            message: message.into(),
        });
    }

    /// One-shot read of pending flashes.
    pub fn take_flashes(&self) -> Vec<Flash> {
        std::mem::take(&mut self.inner.lock().unwrap().data.flashes)
    }

    /// Store validation errors plus the submitted input for form re-render.
    pub fn remember_form(
        &self,
        errors: BTreeMap<String, Vec<String>>,
        old_input: HashMap<String, String>,
    ) {
        let mut inner = self.inner.lock().unwrap();
        inner.data.errors = errors;
        inner.data.old_input = old_input;
    }

    /// One-shot read of stored validation errors.
    pub fn take_errors(&self) -> BTreeMap<String, Vec<String>> {
        std::mem::take(&mut self.inner.lock().unwrap().data.errors)
    }

    /// One-shot read of the previous submission's input.
    pub fn take_old_input(&self) -> HashMap<String, String> {
        std::mem::take(&mut self.inner.lock().unwrap().data.old_input)
    }

    /// State needed by the middleware to persist this session.
    fn persist_state(&self) -> (String, Option<DbId>, String, bool, Option<String>) {
        let mut inner = self.inner.lock().unwrap();
        let data_json = serde_json::to_string(&inner.data)
            .unwrap_or_else(|_| "{}".to_string());
        let out = (
            inner.token.clone(),
            inner.user_id,
            data_json,
            inner.is_new,
            inner.stale_hash.take(),
        );
        inner.is_new = false;
        out
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Session {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Session>().cloned().ok_or_else(|| {
            AppError::InternalError("session middleware not installed".to_string())
        })
    }
}

/// Load-or-create the session before the handler, persist it after.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = cookie_token(req.headers(), SESSION_COOKIE);

    let session = match &token {
        Some(token) => match SessionRepo::find_active(&state.pool, &hash_token(token)).await {
            Ok(Some(record)) => Session::from_record(token.clone(), record),
            Ok(None) => Session::anonymous(),
            Err(err) => {
                tracing::error!(%err, "session load failed, continuing anonymously");
                Session::anonymous()
            }
        },
        None => Session::anonymous(),
    };

    req.extensions_mut().insert(session.clone());
    let mut response = next.run(req).await;

    if let Err(err) = persist_session(&state, &session, &mut response).await {
        tracing::error!(%err, "session persist failed");
    }
    response
}

async fn persist_session(
    state: &AppState,
    session: &Session,
    response: &mut Response,
) -> Result<(), sqlx::Error> {
    let (token, user_id, data, is_new, stale_hash) = session.persist_state();
    let lifetime = Duration::minutes(state.config.session_lifetime_mins);
    let expires_at = Utc::now() + lifetime;

    if let Some(stale) = stale_hash {
        SessionRepo::delete(&state.pool, &stale).await?;
    }

    if is_new {
        SessionRepo::create(
            &state.pool,
            &CreateSession {
                token_hash: hash_token(&token),
                user_id,
                data,
                expires_at,
            },
        )
        .await?;

        let cookie = format!(
            "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            lifetime.num_seconds()
        );
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    } else {
        // Sliding expiry: every request refreshes the deadline.
        SessionRepo::save(&state.pool, &hash_token(&token), user_id, &data, expires_at).await?;
    }
    Ok(())
}

/// Extract a cookie value by name from request headers.
fn cookie_token(headers: &HeaderMap, name: &str) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let raw = header.to_str().ok()?;
        for pair in raw.split(';') {
            if let Some((k, v)) = pair.trim().split_once('=') {
                if k == name && !v.is_empty() {
                    return Some(v.to_string());
                }
            }
        }
    }
    None
}
