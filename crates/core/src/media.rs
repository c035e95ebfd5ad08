//! Local media storage for uploaded panoramas, images and videos.
//!
//! Files live under `<root>/<kind dir>/<generated filename>` and are served
//! publicly at `<public base url>/<kind dir>/<filename>`. Deletion works
//! backwards from a previously issued URL.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::Utc;
use serde::Serialize;

use crate::error::CoreError;
use crate::types::Timestamp;

const MB: u64 = 1024 * 1024;

/// Maximum number of files accepted by a multi-file upload.
pub const MAX_FILES_PER_UPLOAD: usize = 10;

/// The kinds of media a tour references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Panorama,
    Image,
    Video,
}

impl MediaKind {
    pub const ALL: [MediaKind; 3] = [MediaKind::Panorama, MediaKind::Image, MediaKind::Video];

    /// Singular name, used for the upload path segment and multipart field.
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Panorama => "panorama",
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }

    /// Directory under the storage root and public URL segment.
    pub fn dir(self) -> &'static str {
        match self {
            MediaKind::Panorama => "panoramas",
            MediaKind::Image => "images",
            MediaKind::Video => "videos",
        }
    }

    /// Per-kind upload size ceiling in bytes.
    pub fn max_bytes(self) -> u64 {
        match self {
            MediaKind::Panorama => 20 * MB,
            MediaKind::Image => 10 * MB,
            MediaKind::Video => 100 * MB,
        }
    }

    /// Whether a declared MIME type is acceptable for this kind.
    pub fn accepts(self, content_type: &str) -> bool {
        let content_type = content_type.trim().to_ascii_lowercase();
        match self {
            MediaKind::Panorama | MediaKind::Image => content_type.starts_with("image/"),
            MediaKind::Video => content_type.starts_with("video/"),
        }
    }

    pub fn from_dir(dir: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.dir() == dir)
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown media kind '{s}'")))
    }
}

/// Metadata returned to the client after a successful upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredFile {
    pub url: String,
    /// Original client-side filename.
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub content_type: String,
}

/// Result of removing a single media file by URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    /// The URL resolved to a local path but the file was already gone.
    Missing,
    /// The URL does not point into this store (foreign host, unknown
    /// directory, traversal attempt).
    Skipped,
}

/// Tally of a best-effort bulk removal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeReport {
    pub removed: usize,
    pub missing: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Flat-file media store rooted at a local directory.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    public_base_url: String,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        let public_base_url = public_base_url.into().trim_end_matches('/').to_string();
        Self {
            root: root.into(),
            public_base_url,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Local directory holding files of the given kind.
    pub fn kind_dir(&self, kind: MediaKind) -> PathBuf {
        self.root.join(kind.dir())
    }

    /// Create every kind directory if it does not exist yet.
    pub async fn ensure_dirs(&self) -> io::Result<()> {
        for kind in MediaKind::ALL {
            tokio::fs::create_dir_all(self.kind_dir(kind)).await?;
        }
        Ok(())
    }

    /// Whether the upload root is an existing directory the process may
    /// write to, judged from its metadata.
    pub async fn root_writable(&self) -> bool {
        match tokio::fs::metadata(&self.root).await {
            Ok(meta) => meta.is_dir() && !meta.permissions().readonly(),
            Err(_) => false,
        }
    }

    /// Public URL under which a stored file is served.
    pub fn public_url(&self, kind: MediaKind, filename: &str) -> String {
        format!("{}/{}/{}", self.public_base_url, kind.dir(), filename)
    }

    /// Reject uploads with the wrong MIME type or above the size ceiling.
    pub fn check_upload(kind: MediaKind, content_type: &str, size: u64) -> Result<(), CoreError> {
        if !kind.accepts(content_type) {
            let expected = match kind {
                MediaKind::Video => "a video",
                MediaKind::Panorama | MediaKind::Image => "an image",
            };
            return Err(CoreError::Validation(format!(
                "Unsupported file type '{content_type}'. Please upload {expected} file."
            )));
        }
        if size > kind.max_bytes() {
            return Err(CoreError::Validation(format!(
                "File is too large. Maximum size for {kind} uploads is {} MB",
                kind.max_bytes() / MB
            )));
        }
        if size == 0 {
            return Err(CoreError::Validation("Uploaded file is empty".into()));
        }
        Ok(())
    }

    /// Validate and persist an uploaded file, returning its public metadata.
    pub async fn store(
        &self,
        kind: MediaKind,
        original_name: &str,
        content_type: &str,
        data: &[u8],
    ) -> Result<StoredFile, CoreError> {
        Self::check_upload(kind, content_type, data.len() as u64)?;

        let filename = generate_filename(kind, original_name, Utc::now());
        let path = self.kind_dir(kind).join(&filename);

        tokio::fs::create_dir_all(self.kind_dir(kind))
            .await
            .map_err(|e| CoreError::Internal(format!("Failed to prepare upload dir: {e}")))?;
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| CoreError::Internal(format!("Failed to write upload: {e}")))?;

        tracing::info!(%kind, path = %path.display(), size = data.len(), "Stored media file");

        Ok(StoredFile {
            url: self.public_url(kind, &filename),
            name: original_name.to_string(),
            size: data.len() as u64,
            content_type: content_type.to_string(),
        })
    }

    /// Re-derive the local path of a previously issued URL.
    ///
    /// Only URLs of the form `<base>/<kind dir>/<filename>` resolve; anything
    /// else (other hosts, nested paths, `..`) yields `None`.
    pub fn resolve_url(&self, url: &str) -> Option<PathBuf> {
        let rest = url.strip_prefix(&self.public_base_url)?.strip_prefix('/')?;
        let (dir, filename) = rest.split_once('/')?;
        let kind = MediaKind::from_dir(dir)?;

        let is_plain_name = !filename.is_empty()
            && filename != "."
            && filename != ".."
            && !filename.contains(['/', '\\', '\0']);
        if !is_plain_name {
            return None;
        }

        Some(self.kind_dir(kind).join(filename))
    }

    /// Delete the file behind a URL. A missing file is not an error.
    pub async fn remove(&self, url: &str) -> io::Result<RemoveOutcome> {
        let Some(path) = self.resolve_url(url) else {
            return Ok(RemoveOutcome::Skipped);
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(RemoveOutcome::Removed),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(RemoveOutcome::Missing),
            Err(e) => Err(e),
        }
    }

    /// Best-effort removal of many URLs. Failures are logged and counted,
    /// never propagated, and never stop the remaining removals.
    pub async fn purge<I>(&self, urls: I) -> PurgeReport
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut report = PurgeReport::default();
        for url in urls {
            let url = url.as_ref();
            match self.remove(url).await {
                Ok(RemoveOutcome::Removed) => report.removed += 1,
                Ok(RemoveOutcome::Missing) => {
                    tracing::debug!(url, "Media file already absent");
                    report.missing += 1;
                }
                Ok(RemoveOutcome::Skipped) => {
                    tracing::warn!(url, "Media URL does not belong to this store, skipping");
                    report.skipped += 1;
                }
                Err(e) => {
                    tracing::warn!(url, error = %e, "Failed to delete media file");
                    report.failed += 1;
                }
            }
        }
        report
    }
}

/// Build a collision-resistant, timestamp-based filename for an upload.
///
/// Shape: `{kind}_{unix_millis}_{8 hex chars}{.ext}`. The extension is taken
/// from the original filename, lower-cased, and dropped if it is not plain
/// alphanumeric.
pub fn generate_filename(kind: MediaKind, original_name: &str, now: Timestamp) -> String {
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= 10 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default();

    let nonce = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "{}_{}_{}{}",
        kind.as_str(),
        now.timestamp_millis(),
        &nonce[..8],
        ext
    )
}
