//! Handlers for the session lifecycle: login, register, logout.

use std::collections::HashMap;

use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use ecocusco_core::validation::{validate, NoUniqueCheck};
use ecocusco_db::models::user::CreateUser;
use ecocusco_db::repositories::UserRepo;
use ecocusco_db::unique::SqlUniqueCheck;

use crate::auth::password::{hash_password, verify_password};
use crate::error::{is_unique_violation, AppError, AppResult};
use crate::handlers::{csrf_guard, page, sanitized_old};
use crate::session::{Session, CSRF_FIELD};
use crate::state::AppState;
use crate::views::page_context;

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

/// GET /login
pub async fn login_form(State(state): State<AppState>, session: Session) -> AppResult<Response> {
    if session.user_id().is_some() {
        return Ok(Redirect::to("/dashboard").into_response());
    }
    let mut ctx = page_context(&session, None);
    page(&state, &mut ctx, "auth.login", "Iniciar sesión")
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<HashMap<String, String>>,
) -> AppResult<Response> {
    if let Err(response) = csrf_guard(&session, form.get(CSRF_FIELD).map(String::as_str), "/login")
    {
        return Ok(response);
    }

    // 1. Shape check before touching the database.
    let rules = [("email", "required|email"), ("password", "required")];
    let outcome = validate(&form, &HashMap::new(), &rules, &NoUniqueCheck).await?;
    if !outcome.is_valid() {
        session.remember_form(outcome.errors, sanitized_old(&form));
        return Ok(Redirect::to("/login").into_response());
    }

    let email = form.get("email").cloned().unwrap_or_default().to_lowercase();
    let password = form.get("password").cloned().unwrap_or_default();

    // 2. Look up and verify. Same flash for unknown email and wrong
    //    password -- no account enumeration through the form.
    let user = UserRepo::find_by_email(&state.pool, &email).await?;
    let verified = match &user {
        Some(user) => verify_password(&password, &user.password_hash)
            .map_err(|err| AppError::InternalError(format!("password verify: {err}")))?,
        None => false,
    };

    let Some(user) = user.filter(|_| verified) else {
        session.flash("error", "Correo o contraseña incorrectos.");
        session.remember_form(Default::default(), sanitized_old(&form));
        return Ok(Redirect::to("/login").into_response());
    };

    // 3. Rotate the session into an authenticated one.
    session.login(user.id, &user.nombre);
    session.flash("success", format!("¡Bienvenido de nuevo, {}!", user.nombre));
    tracing::info!(user_id = user.id, "user logged in");
    Ok(Redirect::to("/dashboard").into_response())
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// GET /register
pub async fn register_form(State(state): State<AppState>, session: Session) -> AppResult<Response> {
    if session.user_id().is_some() {
        return Ok(Redirect::to("/dashboard").into_response());
    }
    let mut ctx = page_context(&session, None);
    page(&state, &mut ctx, "auth.register", "Crear cuenta")
}

/// POST /register -- creates the account and logs the new user in.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<HashMap<String, String>>,
) -> AppResult<Response> {
    if let Err(response) =
        csrf_guard(&session, form.get(CSRF_FIELD).map(String::as_str), "/register")
    {
        return Ok(response);
    }

    let rules = [
        ("nombre", "required|string|min:2|max:100"),
        ("email", "required|email|max:150|unique:usuarios"),
        ("password", "required|min:6|confirmed"),
    ];
    let unique = SqlUniqueCheck::new(&state.pool);
    let outcome = validate(&form, &HashMap::new(), &rules, &unique).await?;
    if !outcome.is_valid() {
        session.remember_form(outcome.errors, sanitized_old(&form));
        return Ok(Redirect::to("/register").into_response());
    }

    let input = CreateUser {
        nombre: form.get("nombre").cloned().unwrap_or_default().trim().to_string(),
        email: form.get("email").cloned().unwrap_or_default().to_lowercase(),
        password_hash: hash_password(form.get("password").map(String::as_str).unwrap_or_default())
            .map_err(|err| AppError::InternalError(format!("password hash: {err}")))?,
    };

    // The schema's UNIQUE constraint is the real uniqueness gate; the
    // `unique:` rule above only exists for a friendly field error. Two
    // racing registrations resolve here, not in a pre-check.
    let user = match UserRepo::create(&state.pool, &input).await {
        Ok(user) => user,
        Err(err) if is_unique_violation(&err) => {
            session.flash("error", "Ese correo ya está registrado.");
            session.remember_form(Default::default(), sanitized_old(&form));
            return Ok(Redirect::to("/register").into_response());
        }
        Err(err) => return Err(err.into()),
    };

    session.login(user.id, &user.nombre);
    session.flash("success", "Cuenta creada. ¡Bienvenido a EcoCusco!");
    tracing::info!(user_id = user.id, "user registered");
    Ok(Redirect::to("/dashboard").into_response())
}

// ---------------------------------------------------------------------------
// Logout
// ---------------------------------------------------------------------------

/// GET /logout -- confirmation form only; state changes on POST.
pub async fn logout_form(State(state): State<AppState>, session: Session) -> AppResult<Response> {
    if session.user_id().is_none() {
        return Ok(Redirect::to("/").into_response());
    }
    let mut ctx = page_context(&session, None);
    page(&state, &mut ctx, "auth.logout", "Cerrar sesión")
}

/// POST /logout
pub async fn logout(
    State(_state): State<AppState>,
    session: Session,
    Form(form): Form<HashMap<String, String>>,
) -> AppResult<Response> {
    if let Err(response) = csrf_guard(&session, form.get(CSRF_FIELD).map(String::as_str), "/") {
        return Ok(response);
    }
    session.logout();
    session.flash("success", "Sesión cerrada correctamente.");
    Ok(Redirect::to("/").into_response())
}
