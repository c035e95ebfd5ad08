//! Admin gate.
//!
//! The admin flag in the access token may be stale (a user demoted after
//! login still holds a token claiming admin), so the gate re-reads the
//! persisted user row on every request.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use panotour_db::repositories::UserRepo;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires a caller whose user row currently has `is_admin` set.
///
/// Rejects with 401 if the user no longer exists and 403 if they are not an
/// admin.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     // user is guaranteed to be an admin here
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;

        let record = UserRepo::find_by_id(&state.pool, user.user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("User no longer exists"))?;

        if !record.is_admin {
            return Err(AppError::forbidden("You're not an admin"));
        }
        Ok(RequireAdmin(AuthUser {
            is_admin: true,
            ..user
        }))
    }
}
