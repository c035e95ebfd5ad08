//! Route definitions for the `/user` resource.

use axum::routing::{delete, get, put};
use axum::Router;

use crate::handlers::user;
use crate::state::AppState;

/// Routes mounted at `/user`. All require an admin.
///
/// ```text
/// GET    /                   -> list_users
/// DELETE /{id}               -> delete_user
/// PUT    /{id}/toggle-admin  -> toggle_admin
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(user::list_users))
        .route("/{id}", delete(user::delete_user))
        .route("/{id}/toggle-admin", put(user::toggle_admin))
}
