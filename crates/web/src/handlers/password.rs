//! Handlers for the forgot/reset password flow.
//!
//! Reset links are not emailed (there is no mail service in this
//! deployment); the link is written to the application log at info level
//! for the operator to relay. Only the token digest is ever stored.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use chrono::{Duration, Utc};
use ecocusco_core::validation::{validate, NoUniqueCheck};
use ecocusco_db::repositories::{PasswordResetRepo, UserRepo};

use crate::auth::password::hash_password;
use crate::auth::token::{generate_token, hash_token};
use crate::error::{AppError, AppResult};
use crate::handlers::{csrf_guard, page, sanitized_old};
use crate::session::{Session, CSRF_FIELD};
use crate::state::AppState;
use crate::views::page_context;

/// Neutral flash used whether or not the email exists. Account existence
/// is not disclosed through this form.
const FORGOT_NOTICE: &str =
    "Si el correo está registrado, recibirás instrucciones para restablecer tu contraseña.";

/// GET /forgot-password
pub async fn forgot_form(State(state): State<AppState>, session: Session) -> AppResult<Response> {
    let mut ctx = page_context(&session, None);
    page(&state, &mut ctx, "auth.forgot", "Recuperar contraseña")
}

/// POST /forgot-password -- upserts a reset token keyed by email.
pub async fn forgot(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<HashMap<String, String>>,
) -> AppResult<Response> {
    if let Err(response) =
        csrf_guard(&session, form.get(CSRF_FIELD).map(String::as_str), "/forgot-password")
    {
        return Ok(response);
    }

    let rules = [("email", "required|email")];
    let outcome = validate(&form, &HashMap::new(), &rules, &NoUniqueCheck).await?;
    if !outcome.is_valid() {
        session.remember_form(outcome.errors, sanitized_old(&form));
        return Ok(Redirect::to("/forgot-password").into_response());
    }

    let email = form.get("email").cloned().unwrap_or_default().to_lowercase();
    if let Some(user) = UserRepo::find_by_email(&state.pool, &email).await? {
        let token = generate_token();
        let expires_at = Utc::now() + Duration::minutes(state.config.reset_token_expiry_mins);
        PasswordResetRepo::upsert(&state.pool, &user.email, &hash_token(&token), expires_at)
            .await?;
        tracing::info!(
            user_id = user.id,
            reset_path = %format!("/reset-password/{token}"),
            "password reset link issued"
        );
    }

    session.flash("info", FORGOT_NOTICE);
    Ok(Redirect::to("/login").into_response())
}

/// GET /reset-password/{token}
pub async fn reset_form(
    State(state): State<AppState>,
    session: Session,
    Path(token): Path<String>,
) -> AppResult<Response> {
    if PasswordResetRepo::find_valid(&state.pool, &hash_token(&token))
        .await?
        .is_none()
    {
        session.flash("error", "El enlace de restablecimiento no es válido o ya expiró.");
        return Ok(Redirect::to("/forgot-password").into_response());
    }

    let mut ctx = page_context(&session, None);
    ctx.insert("token", &token);
    page(&state, &mut ctx, "auth.reset", "Nueva contraseña")
}

/// POST /reset-password/{token} -- consumes the token and sets the new hash.
pub async fn reset(
    State(state): State<AppState>,
    session: Session,
    Path(token): Path<String>,
    Form(form): Form<HashMap<String, String>>,
) -> AppResult<Response> {
    let back = format!("/reset-password/{token}");
    if let Err(response) = csrf_guard(&session, form.get(CSRF_FIELD).map(String::as_str), &back) {
        return Ok(response);
    }

    let rules = [("password", "required|min:6|confirmed")];
    let outcome = validate(&form, &HashMap::new(), &rules, &NoUniqueCheck).await?;
    if !outcome.is_valid() {
        session.remember_form(outcome.errors, HashMap::new());
        return Ok(Redirect::to(&back).into_response());
    }

    let Some(reset) = PasswordResetRepo::find_valid(&state.pool, &hash_token(&token)).await? else {
        session.flash("error", "El enlace de restablecimiento no es válido o ya expiró.");
        return Ok(Redirect::to("/forgot-password").into_response());
    };

    let Some(user) = UserRepo::find_by_email(&state.pool, &reset.email).await? else {
        // Account deleted between issue and use; consume the token anyway.
        PasswordResetRepo::delete(&state.pool, &reset.email).await?;
        session.flash("error", "La cuenta asociada ya no existe.");
        return Ok(Redirect::to("/forgot-password").into_response());
    };

    let password_hash = hash_password(form.get("password").map(String::as_str).unwrap_or_default())
        .map_err(|err| AppError::InternalError(format!("password hash: {err}")))?;
    UserRepo::update_password(&state.pool, user.id, &password_hash).await?;
    PasswordResetRepo::delete(&state.pool, &reset.email).await?;

    tracing::info!(user_id = user.id, "password reset completed");
    session.flash("success", "Contraseña actualizada. Ya puedes iniciar sesión.");
    Ok(Redirect::to("/login").into_response())
}
