//! Route definitions for the `/upload` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;
use panotour_core::media::{MediaKind, MAX_FILES_PER_UPLOAD};

use crate::handlers::upload;
use crate::state::AppState;

/// Request body ceiling for upload routes: room for the largest accepted
/// payload plus multipart framing. Per-file limits are enforced per kind.
pub fn upload_body_limit() -> usize {
    let largest_single = MediaKind::ALL
        .iter()
        .map(|kind| kind.max_bytes())
        .max()
        .unwrap_or_default();
    let largest_multiple = MediaKind::Image.max_bytes() * MAX_FILES_PER_UPLOAD as u64;
    (largest_single.max(largest_multiple) + 1024 * 1024) as usize
}

/// Routes mounted at `/upload`. All require an admin.
///
/// ```text
/// POST /multiple  -> upload_multiple
/// POST /{kind}    -> upload_single (panorama | image | video)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/multiple", post(upload::upload_multiple))
        .route("/{kind}", post(upload::upload_single))
        .layer(DefaultBodyLimit::max(upload_body_limit()))
}
