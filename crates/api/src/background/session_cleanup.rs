//! Periodic purge of expired and revoked refresh sessions.

use std::time::Duration;

use panotour_db::repositories::SessionRepo;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// Run the session cleanup loop until `cancel` is triggered.
///
/// The first purge runs immediately, then once per `every` (at least one
/// second).
pub async fn run(pool: PgPool, every: Duration, cancel: CancellationToken) {
    let every = every.max(Duration::from_secs(1));
    tracing::info!(
        interval_secs = every.as_secs(),
        "Session cleanup job started"
    );

    let mut interval = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session cleanup job stopping");
                break;
            }
            _ = interval.tick() => {
                match SessionRepo::cleanup_expired(&pool).await {
                    Ok(deleted) if deleted > 0 => {
                        tracing::info!(deleted, "Session cleanup: purged stale sessions");
                    }
                    Ok(_) => tracing::debug!("Session cleanup: nothing to purge"),
                    Err(e) => {
                        tracing::error!(error = %e, "Session cleanup: purge failed");
                    }
                }
            }
        }
    }
}
