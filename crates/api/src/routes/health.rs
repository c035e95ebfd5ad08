use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Body of `GET /health`.
///
/// `status` is `"ok"` only when both the database answers and the upload
/// root can take new files; otherwise `"degraded"`. The endpoint itself
/// always answers 200 so load balancers can read the details.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    pub media_writable: bool,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let (db, media_writable) = tokio::join!(
        panotour_db::health_check(&state.pool),
        state.media.root_writable(),
    );
    let db_healthy = db.is_ok();

    if !media_writable {
        tracing::warn!(root = %state.media.root().display(), "Upload root is not writable");
    }

    Json(HealthResponse {
        status: if db_healthy && media_writable { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        media_writable,
    })
}

/// `/health`, mounted at the root next to the static media routes.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
