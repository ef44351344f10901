//! User entity model and DTOs.

use ecocusco_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full user row from the `usuarios` table.
///
/// Contains the password hash -- NEVER serialize this to responses or
/// template contexts directly. Use [`UserResponse`] for anything that leaves
/// the server.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub nombre: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe user representation for API responses and templates (no hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub nombre: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: Timestamp,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            nombre: user.nombre,
            email: user.email,
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

/// DTO for creating a new user.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub nombre: String,
    pub email: String,
    pub password_hash: String,
}

/// DTO for updating a user's profile. All fields optional.
#[derive(Debug, Deserialize)]
pub struct UpdateUser {
    pub nombre: Option<String>,
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn response_never_carries_the_password_hash() {
        let user = User {
            id: 1,
            nombre: "Ana".into(),
            email: "ana@x.com".into(),
            password_hash: "$argon2id$supersecret".into(),
            is_admin: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "ana@x.com");
    }
}
