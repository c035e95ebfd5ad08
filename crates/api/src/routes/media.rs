//! Static serving of uploaded media.

use axum::Router;
use panotour_core::media::{MediaKind, MediaStore};
use tower_http::services::ServeDir;

use crate::state::AppState;

/// Serve each media kind's directory at `/{dir}`, e.g. `/panoramas/<file>`.
pub fn router(store: &MediaStore) -> Router<AppState> {
    MediaKind::ALL.iter().fold(Router::new(), |router, kind| {
        router.nest_service(
            &format!("/{}", kind.dir()),
            ServeDir::new(store.kind_dir(*kind)),
        )
    })
}
