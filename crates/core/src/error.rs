//! Domain error taxonomy shared by the persistence and web layers.

use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} con id {id} no existe")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validación fallida: {0}")]
    Validation(String),

    #[error("Conflicto: {0}")]
    Conflict(String),

    #[error("No autenticado: {0}")]
    Unauthorized(String),

    #[error("No autorizado: {0}")]
    Forbidden(String),

    /// A one-time token (password reset) that is past its expiry.
    #[error("Token expirado: {0}")]
    Expired(String),

    #[error("Error interno: {0}")]
    Internal(String),
}
