//! Media upload handlers.
//!
//! Files arrive as `multipart/form-data`. A single upload reads the form
//! field named after the media kind (`panorama`, `image`, `video`); a
//! multiple upload reads up to [`MAX_FILES_PER_UPLOAD`] image files from the
//! `files` field.

use axum::extract::{Multipart, State};
use axum::Json;
use panotour_core::error::CoreError;
use panotour_core::media::{MediaKind, StoredFile, MAX_FILES_PER_UPLOAD};

use crate::error::{AppError, AppResult};
use crate::extract::ApiPath;
use crate::middleware::rbac::RequireAdmin;
use crate::response::{Envelope, FilePayload, FilesPayload};
use crate::state::AppState;

/// Form field carrying the files of a multiple upload.
pub const MULTIPLE_FIELD: &str = "files";

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// POST /api/upload/{kind}
///
/// Store one file of the given kind and return its public URL.
pub async fn upload_single(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiPath(kind): ApiPath<String>,
    mut multipart: Multipart,
) -> AppResult<Json<Envelope<FilePayload>>> {
    let kind: MediaKind = kind
        .parse()
        .map_err(|_| CoreError::not_found("Upload kind", &kind))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(kind.as_str()) {
            continue;
        }
        let original_name = field.file_name().unwrap_or(kind.as_str()).to_string();
        let content_type = field
            .content_type()
            .unwrap_or(FALLBACK_CONTENT_TYPE)
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        let file = state
            .media
            .store(kind, &original_name, &content_type, &data)
            .await?;
        tracing::info!(%kind, url = %file.url, uploaded_by = admin.user_id, "File uploaded");

        return Ok(Json(Envelope::ok(
            "File uploaded successfully",
            FilePayload { file },
        )));
    }

    Err(AppError::BadRequest(format!(
        "No file uploaded. Expected form field '{kind}'"
    )))
}

/// POST /api/upload/multiple
///
/// Store up to ten image files at once. All-or-nothing: if any file is
/// rejected, the files already written by this request are removed again.
pub async fn upload_multiple(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<Envelope<FilesPayload>>> {
    let mut stored: Vec<StoredFile> = Vec::new();

    let result = store_all(&state, &mut multipart, &mut stored).await;
    if let Err(e) = result {
        if !stored.is_empty() {
            let urls: Vec<String> = stored.into_iter().map(|f| f.url).collect();
            let report = state.media.purge(urls).await;
            tracing::debug!(removed = report.removed, "Rolled back partial multiple upload");
        }
        return Err(e);
    }

    if stored.is_empty() {
        return Err(AppError::BadRequest(format!(
            "No files uploaded. Expected form field '{MULTIPLE_FIELD}'"
        )));
    }

    tracing::info!(count = stored.len(), uploaded_by = admin.user_id, "Files uploaded");

    Ok(Json(Envelope::ok(
        "Files uploaded successfully",
        FilesPayload {
            count: stored.len(),
            files: stored,
        },
    )))
}

async fn store_all(
    state: &AppState,
    multipart: &mut Multipart,
    stored: &mut Vec<StoredFile>,
) -> AppResult<()> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(MULTIPLE_FIELD) {
            continue;
        }
        if stored.len() == MAX_FILES_PER_UPLOAD {
            return Err(AppError::BadRequest(format!(
                "Too many files. At most {MAX_FILES_PER_UPLOAD} files per upload"
            )));
        }

        let original_name = field.file_name().unwrap_or("image").to_string();
        let content_type = field
            .content_type()
            .unwrap_or(FALLBACK_CONTENT_TYPE)
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        let file = state
            .media
            .store(MediaKind::Image, &original_name, &content_type, &data)
            .await?;
        stored.push(file);
    }
    Ok(())
}
