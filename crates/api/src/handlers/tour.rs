//! Handlers for the `/tours` resource.
//!
//! Reads are public so the viewer can load tours anonymously; every write
//! requires an admin.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use panotour_core::error::CoreError;
use panotour_core::tour::TourInput;
use panotour_db::repositories::TourRepo;

use crate::error::AppResult;
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::rbac::RequireAdmin;
use crate::response::{Envelope, NoData, TourListPayload, TourPayload};
use crate::state::AppState;

/// GET /api/tours
///
/// Every tour in creation order. No pagination.
pub async fn list_tours(
    State(state): State<AppState>,
) -> AppResult<Json<Envelope<TourListPayload>>> {
    let tours = TourRepo::list(&state.pool).await?;
    Ok(Json(Envelope::ok(
        "Tours retrieved successfully",
        TourListPayload {
            count: tours.len(),
            tours,
        },
    )))
}

/// GET /api/tours/{tour_id}
pub async fn get_tour(
    State(state): State<AppState>,
    ApiPath(tour_id): ApiPath<String>,
) -> AppResult<Json<Envelope<TourPayload>>> {
    let tour = TourRepo::find_by_tour_id(&state.pool, &tour_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Tour", &tour_id))?;
    Ok(Json(Envelope::ok(
        "Tour retrieved successfully",
        TourPayload { tour },
    )))
}

/// POST /api/tours
///
/// Validate the body and store it under the next sequential tour id. Any
/// `tourId` in the body is ignored.
pub async fn create_tour(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<TourInput>,
) -> AppResult<(StatusCode, Json<Envelope<TourPayload>>)> {
    let input = input.validated()?;
    let tour = TourRepo::create(&state.pool, &input).await?;

    tracing::info!(
        tour_id = %tour.tour_id,
        panoramas = tour.panoramas.len(),
        created_by = admin.user_id,
        "Tour created"
    );

    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok("Tour created successfully", TourPayload { tour })),
    ))
}

/// PUT /api/tours/{tour_id}
///
/// Replace the whole editable snapshot. Unknown ids answer 404 and write
/// nothing; the id is checked before the body is validated.
pub async fn update_tour(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiPath(tour_id): ApiPath<String>,
    ApiJson(input): ApiJson<TourInput>,
) -> AppResult<Json<Envelope<TourPayload>>> {
    if TourRepo::find_by_tour_id(&state.pool, &tour_id).await?.is_none() {
        return Err(CoreError::not_found("Tour", &tour_id).into());
    }

    let input = input.validated()?;
    let tour = TourRepo::replace(&state.pool, &tour_id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Tour", &tour_id))?;

    tracing::info!(tour_id = %tour.tour_id, updated_by = admin.user_id, "Tour updated");

    Ok(Json(Envelope::ok(
        "Tour updated successfully",
        TourPayload { tour },
    )))
}

/// DELETE /api/tours/{tour_id}
///
/// Best-effort delete every media file the tour references, then the row.
/// File failures are logged and never block the deletion.
pub async fn delete_tour(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiPath(tour_id): ApiPath<String>,
) -> AppResult<Json<Envelope<NoData>>> {
    let tour = TourRepo::find_by_tour_id(&state.pool, &tour_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Tour", &tour_id))?;

    let report = state.media.purge(tour.media_urls()).await;

    if !TourRepo::delete(&state.pool, &tour_id).await? {
        return Err(CoreError::not_found("Tour", &tour_id).into());
    }

    tracing::info!(
        %tour_id,
        files_removed = report.removed,
        files_missing = report.missing,
        files_skipped = report.skipped,
        files_failed = report.failed,
        deleted_by = admin.user_id,
        "Tour deleted"
    );

    Ok(Json(Envelope::message("Tour deleted successfully")))
}
