//! HTTP-level tests for registration, login, logout, CSRF enforcement,
//! and the password reset flow.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{body_string, location, register_user, TestClient};
use ecocusco_db::repositories::{PasswordResetRepo, UserRepo};
use ecocusco_db::DbPool;
use ecocusco_web::auth::token::hash_token;

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// Registering creates the row, logs the user in, and lands on the
/// dashboard.
#[sqlx::test(migrations = "../db/migrations")]
async fn register_creates_and_logs_in(pool: DbPool) {
    let mut client = TestClient::new(pool.clone());
    register_user(&mut client, "Ana", "a@x.com").await;

    let user = UserRepo::find_by_email(&pool, "a@x.com")
        .await
        .unwrap()
        .expect("user row should exist");
    assert_eq!(user.nombre, "Ana");

    let response = client.get("/dashboard").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("Ana"), "dashboard should greet the user");
}

/// A malformed submission bounces back with field errors and writes nothing.
#[sqlx::test(migrations = "../db/migrations")]
async fn register_rejects_invalid_input(pool: DbPool) {
    let mut client = TestClient::new(pool.clone());
    let csrf = client.fetch_csrf("/register").await;
    let response = client
        .post_form(
            "/register",
            &[
                ("_token", csrf.as_str()),
                ("nombre", "A"),
                ("email", "not-an-email"),
                ("password", "123"),
                ("password_confirmation", "456"),
            ],
        )
        .await;
    assert_eq!(location(&response), "/register");

    // The re-rendered form carries the stored errors and the old input.
    let response = client.get("/register").await;
    let html = body_string(response).await;
    assert!(html.contains("correo válido"));
    assert!(html.contains("not-an-email"));

    assert!(UserRepo::find_by_email(&pool, "not-an-email")
        .await
        .unwrap()
        .is_none());
}

/// Duplicate emails are refused; only one row exists afterwards.
#[sqlx::test(migrations = "../db/migrations")]
async fn register_rejects_duplicate_email(pool: DbPool) {
    let mut first = TestClient::new(pool.clone());
    register_user(&mut first, "Ana", "dup@x.com").await;

    let mut second = TestClient::new(pool.clone());
    let csrf = second.fetch_csrf("/register").await;
    let response = second
        .post_form(
            "/register",
            &[
                ("_token", csrf.as_str()),
                ("nombre", "Otra Ana"),
                ("email", "dup@x.com"),
                ("password", "secret1"),
                ("password_confirmation", "secret1"),
            ],
        )
        .await;
    assert_eq!(location(&response), "/register");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM usuarios WHERE email = 'dup@x.com'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

// ---------------------------------------------------------------------------
// Login / logout
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn login_verifies_credentials(pool: DbPool) {
    let mut setup = TestClient::new(pool.clone());
    register_user(&mut setup, "Ana", "ana@x.com").await;

    // Wrong password: back to the form, still logged out.
    let mut client = TestClient::new(pool.clone());
    let csrf = client.fetch_csrf("/login").await;
    let response = client
        .post_form(
            "/login",
            &[
                ("_token", csrf.as_str()),
                ("email", "ana@x.com"),
                ("password", "wrong-password"),
            ],
        )
        .await;
    assert_eq!(location(&response), "/login");
    let response = client.get("/dashboard").await;
    assert_eq!(location(&response), "/login");

    // Correct password: dashboard.
    let csrf = client.fetch_csrf("/login").await;
    let response = client
        .post_form(
            "/login",
            &[
                ("_token", csrf.as_str()),
                ("email", "ana@x.com"),
                ("password", "secret1"),
            ],
        )
        .await;
    assert_eq!(location(&response), "/dashboard");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn logout_destroys_the_session(pool: DbPool) {
    let mut client = TestClient::new(pool.clone());
    register_user(&mut client, "Ana", "ana@x.com").await;

    let csrf = client.fetch_csrf("/logout").await;
    let response = client
        .post_form("/logout", &[("_token", csrf.as_str())])
        .await;
    assert_eq!(location(&response), "/");

    let response = client.get("/dashboard").await;
    assert_eq!(location(&response), "/login");
}

// ---------------------------------------------------------------------------
// CSRF
// ---------------------------------------------------------------------------

/// A state-changing POST without a valid token never applies the mutation.
#[sqlx::test(migrations = "../db/migrations")]
async fn csrf_mismatch_blocks_the_mutation(pool: DbPool) {
    let mut client = TestClient::new(pool.clone());

    // Prime a session so the request carries a cookie but a bad token.
    client.get("/register").await;
    let response = client
        .post_form(
            "/register",
            &[
                ("_token", "forged-token"),
                ("nombre", "Mallory"),
                ("email", "mallory@x.com"),
                ("password", "secret1"),
                ("password_confirmation", "secret1"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    assert!(UserRepo::find_by_email(&pool, "mallory@x.com")
        .await
        .unwrap()
        .is_none());
}

/// The same token stays valid across submissions within one session.
#[sqlx::test(migrations = "../db/migrations")]
async fn csrf_token_is_reusable_within_a_session(pool: DbPool) {
    let mut client = TestClient::new(pool.clone());
    register_user(&mut client, "Ana", "ana@x.com").await;

    let csrf = client.fetch_csrf("/reportes/crear").await;
    for ubicacion in ["Plaza Mayor", "San Blas"] {
        let response = client
            .post_multipart(
                "/reportes",
                &[
                    ("_token", csrf.as_str()),
                    ("tipo_material", "papel"),
                    ("cantidad", "1.0"),
                    ("ubicacion", ubicacion),
                ],
            )
            .await;
        assert_eq!(location(&response), "/reportes");
    }

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reportes")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 2);
}

// ---------------------------------------------------------------------------
// Password reset
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn forgot_password_issues_a_token(pool: DbPool) {
    let mut client = TestClient::new(pool.clone());
    register_user(&mut client, "Ana", "ana@x.com").await;

    let mut visitor = TestClient::new(pool.clone());
    let csrf = visitor.fetch_csrf("/forgot-password").await;
    let response = visitor
        .post_form(
            "/forgot-password",
            &[("_token", csrf.as_str()), ("email", "ana@x.com")],
        )
        .await;
    assert_eq!(location(&response), "/login");

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM password_resets WHERE email = 'ana@x.com'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn reset_consumes_the_token_and_changes_the_password(pool: DbPool) {
    let mut setup = TestClient::new(pool.clone());
    register_user(&mut setup, "Ana", "ana@x.com").await;

    // Plant a known token, as the forgot handler would.
    let token = "known-test-token-value";
    PasswordResetRepo::upsert(
        &pool,
        "ana@x.com",
        &hash_token(token),
        Utc::now() + Duration::minutes(60),
    )
    .await
    .unwrap();

    let mut client = TestClient::new(pool.clone());
    let csrf = client.fetch_csrf(&format!("/reset-password/{token}")).await;
    let response = client
        .post_form(
            &format!("/reset-password/{token}"),
            &[
                ("_token", csrf.as_str()),
                ("password", "brand-new-pass"),
                ("password_confirmation", "brand-new-pass"),
            ],
        )
        .await;
    assert_eq!(location(&response), "/login");

    // The token is single-use.
    assert!(PasswordResetRepo::find_valid(&pool, &hash_token(token))
        .await
        .unwrap()
        .is_none());

    // The new password works.
    let csrf = client.fetch_csrf("/login").await;
    let response = client
        .post_form(
            "/login",
            &[
                ("_token", csrf.as_str()),
                ("email", "ana@x.com"),
                ("password", "brand-new-pass"),
            ],
        )
        .await;
    assert_eq!(location(&response), "/dashboard");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn expired_reset_token_is_rejected(pool: DbPool) {
    let mut setup = TestClient::new(pool.clone());
    register_user(&mut setup, "Ana", "ana@x.com").await;

    let token = "stale-token";
    PasswordResetRepo::upsert(
        &pool,
        "ana@x.com",
        &hash_token(token),
        Utc::now() - Duration::minutes(1),
    )
    .await
    .unwrap();

    let mut client = TestClient::new(pool.clone());
    let response = client.get(&format!("/reset-password/{token}")).await;
    assert_eq!(location(&response), "/forgot-password");
}
