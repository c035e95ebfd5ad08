//! Shared response envelope types for API handlers.
//!
//! Every successful response carries `success: true` and a human-readable
//! `message`, with the payload fields flattened beside them:
//!
//! ```json
//! { "success": true, "message": "Tour created", "tour": { ... } }
//! ```
//!
//! Error responses use the same top-level keys; see [`crate::error::AppError`].

use panotour_core::media::StoredFile;
use panotour_db::models::tour::Tour;
use panotour_db::models::user::UserResponse;
use serde::Serialize;

/// Standard `{ success, message, ...payload }` envelope.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

impl Envelope<NoData> {
    /// Envelope with no payload beyond the message.
    pub fn message(message: impl Into<String>) -> Self {
        Self::ok(message, NoData {})
    }
}

/// Empty payload.
#[derive(Debug, Serialize)]
pub struct NoData {}

#[derive(Debug, Serialize)]
pub struct TourPayload {
    pub tour: Tour,
}

#[derive(Debug, Serialize)]
pub struct TourListPayload {
    pub count: usize,
    pub tours: Vec<Tour>,
}

#[derive(Debug, Serialize)]
pub struct UserPayload {
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct UserListPayload {
    pub count: usize,
    pub users: Vec<UserResponse>,
}

#[derive(Debug, Serialize)]
pub struct FilePayload {
    pub file: StoredFile,
}

#[derive(Debug, Serialize)]
pub struct FilesPayload {
    pub count: usize,
    pub files: Vec<StoredFile>,
}
