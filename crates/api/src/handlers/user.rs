//! Admin-only user management handlers.

use axum::extract::State;
use axum::Json;
use panotour_core::error::CoreError;
use panotour_core::types::DbId;
use panotour_db::models::user::UserResponse;
use panotour_db::repositories::{SessionRepo, UserRepo};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::rbac::RequireAdmin;
use crate::response::{Envelope, NoData, UserListPayload, UserPayload};
use crate::state::AppState;

/// GET /api/user
///
/// List all users. Password hashes are never included.
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<Envelope<UserListPayload>>> {
    let users: Vec<UserResponse> = UserRepo::list(&state.pool)
        .await?
        .iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(Envelope::ok(
        "Users retrieved successfully",
        UserListPayload {
            count: users.len(),
            users,
        },
    )))
}

/// DELETE /api/user/{id}
///
/// Hard-delete a user. Their sessions go with them.
pub async fn delete_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<Envelope<NoData>>> {
    if !UserRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("User", id).into());
    }

    tracing::info!(user_id = id, deleted_by = admin.user_id, "User deleted");
    Ok(Json(Envelope::message("User has been deleted")))
}

/// PUT /api/user/{id}/toggle-admin
///
/// Body: `{"status": true|false}`. Checks run in order: the target must
/// exist (404), must not be the caller (403), and `status` must be a
/// boolean (400). Demotion revokes the user's refresh sessions, so the
/// demoted account has to log in again.
pub async fn toggle_admin(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
    ApiJson(body): ApiJson<Value>,
) -> AppResult<Json<Envelope<UserPayload>>> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", id))?;

    if id == admin.user_id {
        return Err(AppError::forbidden(
            "You cannot modify your own admin status",
        ));
    }

    let status = body
        .get("status")
        .and_then(Value::as_bool)
        .ok_or_else(|| AppError::BadRequest("Invalid status value".into()))?;

    let user = UserRepo::set_admin(&state.pool, id, status)
        .await?
        .ok_or_else(|| CoreError::not_found("User", id))?;

    let revoked = if status {
        0
    } else {
        SessionRepo::revoke_all_for_user(&state.pool, id).await?
    };

    tracing::info!(
        user_id = id,
        admin = status,
        sessions_revoked = revoked,
        changed_by = admin.user_id,
        "Admin flag updated"
    );

    let verb = if status { "promoted to" } else { "demoted from" };
    Ok(Json(Envelope::ok(
        format!("User {verb} admin successfully"),
        UserPayload {
            user: UserResponse::from(&user),
        },
    )))
}
