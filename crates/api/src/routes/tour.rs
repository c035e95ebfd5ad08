//! Route definitions for the `/tours` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::tour;
use crate::state::AppState;

/// Routes mounted at `/tours`.
///
/// ```text
/// GET    /            -> list_tours
/// POST   /            -> create_tour (admin)
/// GET    /{tour_id}   -> get_tour
/// PUT    /{tour_id}   -> update_tour (admin)
/// DELETE /{tour_id}   -> delete_tour (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(tour::list_tours).post(tour::create_tour))
        .route(
            "/{tour_id}",
            get(tour::get_tour)
                .put(tour::update_tour)
                .delete(tour::delete_tour),
        )
}
