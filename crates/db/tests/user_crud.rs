//! Repository-level tests for users: CRUD, uniqueness, password updates.

use ecocusco_db::models::user::{CreateUser, UpdateUser};
use ecocusco_db::repositories::UserRepo;
use ecocusco_db::DbPool;

fn input(nombre: &str, email: &str) -> CreateUser {
    CreateUser {
        nombre: nombre.to_string(),
        email: email.to_string(),
        password_hash: "$argon2id$test-hash".to_string(),
    }
}

#[sqlx::test]
async fn create_and_find_round_trip(pool: DbPool) {
    let user = UserRepo::create(&pool, &input("Ana", "ana@x.com"))
        .await
        .expect("creation should succeed");
    assert!(user.id > 0);
    assert!(!user.is_admin);

    let found = UserRepo::find_by_id(&pool, user.id)
        .await
        .expect("query should succeed")
        .expect("user should exist");
    assert_eq!(found.email, "ana@x.com");

    let by_email = UserRepo::find_by_email(&pool, "ana@x.com")
        .await
        .expect("query should succeed")
        .expect("user should exist");
    assert_eq!(by_email.id, user.id);
}

#[sqlx::test]
async fn find_missing_user_returns_none(pool: DbPool) {
    let found = UserRepo::find_by_id(&pool, 999_999)
        .await
        .expect("query should succeed");
    assert!(found.is_none());
}

/// The email uniqueness invariant lives in the schema, not in a pre-check.
#[sqlx::test]
async fn duplicate_email_violates_the_constraint(pool: DbPool) {
    UserRepo::create(&pool, &input("Ana", "dup@x.com"))
        .await
        .expect("first creation should succeed");

    let err = UserRepo::create(&pool, &input("Beto", "dup@x.com"))
        .await
        .expect_err("second creation must fail");

    let db_err = err.as_database_error().expect("should be a database error");
    assert_eq!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation);
}

#[sqlx::test]
async fn update_applies_only_provided_fields(pool: DbPool) {
    let user = UserRepo::create(&pool, &input("Ana", "ana@x.com"))
        .await
        .expect("creation should succeed");

    let updated = UserRepo::update(
        &pool,
        user.id,
        &UpdateUser {
            nombre: Some("Ana María".to_string()),
            email: None,
        },
    )
    .await
    .expect("update should succeed")
    .expect("row should exist");

    assert_eq!(updated.nombre, "Ana María");
    assert_eq!(updated.email, "ana@x.com");
}

#[sqlx::test]
async fn update_password_replaces_the_hash(pool: DbPool) {
    let user = UserRepo::create(&pool, &input("Ana", "ana@x.com"))
        .await
        .expect("creation should succeed");

    let changed = UserRepo::update_password(&pool, user.id, "$argon2id$new-hash")
        .await
        .expect("update should succeed");
    assert!(changed);

    let found = UserRepo::find_by_id(&pool, user.id)
        .await
        .expect("query should succeed")
        .expect("user should exist");
    assert_eq!(found.password_hash, "$argon2id$new-hash");

    let missing = UserRepo::update_password(&pool, 999_999, "x")
        .await
        .expect("update should succeed");
    assert!(!missing);
}
