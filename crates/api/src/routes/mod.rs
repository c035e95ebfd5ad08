pub mod auth;
pub mod health;
pub mod media;
pub mod tour;
pub mod upload;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                       register (public)
/// /auth/login                          login (public)
/// /auth/refresh                        refresh (refresh cookie)
/// /auth/logout                         logout (requires auth)
/// /auth/me                             decoded identity (requires auth)
///
/// /user                                list (admin only)
/// /user/{id}                           delete (admin only)
/// /user/{id}/toggle-admin              set admin flag (admin only)
///
/// /tours                               list (public), create (admin only)
/// /tours/{tour_id}                     get (public), replace, delete (admin only)
///
/// /upload/{panorama|image|video}       single upload (admin only)
/// /upload/multiple                     up to 10 images (admin only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/user", user::router())
        .nest("/tours", tour::router())
        .nest("/upload", upload::router())
}
