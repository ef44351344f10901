//! Periodic cleanup of expired sessions and password-reset tokens.
//!
//! Spawns a background loop that deletes rows past their `expires_at`.
//! Runs on a fixed interval using `tokio::time::interval` until cancelled.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use ecocusco_db::repositories::{PasswordResetRepo, SessionRepo};
use ecocusco_db::DbPool;

/// How often the cleanup job runs.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600); // 1 hour

/// Run the expiry sweep loop until `cancel` is triggered.
pub async fn run(pool: DbPool, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = CLEANUP_INTERVAL.as_secs(),
        "Expiry cleanup job started"
    );

    let mut interval = tokio::time::interval(CLEANUP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Expiry cleanup job stopping");
                break;
            }
            _ = interval.tick() => {
                match SessionRepo::cleanup_expired(&pool).await {
                    Ok(deleted) if deleted > 0 => {
                        tracing::info!(deleted, "Expiry cleanup: purged stale sessions");
                    }
                    Ok(_) => tracing::debug!("Expiry cleanup: no stale sessions"),
                    Err(e) => tracing::error!(error = %e, "Expiry cleanup: session sweep failed"),
                }
                match PasswordResetRepo::cleanup_expired(&pool).await {
                    Ok(deleted) if deleted > 0 => {
                        tracing::info!(deleted, "Expiry cleanup: purged stale reset tokens");
                    }
                    Ok(_) => tracing::debug!("Expiry cleanup: no stale reset tokens"),
                    Err(e) => tracing::error!(error = %e, "Expiry cleanup: token sweep failed"),
                }
            }
        }
    }
}
