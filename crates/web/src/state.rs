use std::sync::Arc;

use crate::config::AppConfig;
use crate::views::ViewEngine;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: ecocusco_db::DbPool,
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Compiled template engine.
    pub views: Arc<ViewEngine>,
}
