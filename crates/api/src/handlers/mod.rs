pub mod auth;
pub mod tour;
pub mod upload;
pub mod user;

use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

/// Fallback for every unmatched route.
pub async fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "message": "API endpoint not found",
        })),
    )
}
