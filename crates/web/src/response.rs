//! Shared response envelope types for API handlers.
//!
//! All `/api` responses use the `{ success, message, data | errors }`
//! envelope. Use [`ApiResponse`] instead of ad-hoc `serde_json::json!` so
//! the shape stays consistent across handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Success envelope: `{ "success": true, "message": ..., "data": ... }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK envelope.
    pub fn ok(message: impl Into<String>, data: T) -> Response {
        Self::with_status(StatusCode::OK, message, data)
    }

    /// 201 Created envelope.
    pub fn created(message: impl Into<String>, data: T) -> Response {
        Self::with_status(StatusCode::CREATED, message, data)
    }

    fn with_status(status: StatusCode, message: impl Into<String>, data: T) -> Response {
        let body = ApiResponse {
            success: true,
            message: message.into(),
            data,
        };
        (status, Json(body)).into_response()
    }
}
