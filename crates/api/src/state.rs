use std::sync::Arc;

use panotour_core::media::MediaStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: panotour_db::DbPool,
    /// Server configuration (JWT settings, cookie flags, limits).
    pub config: Arc<ServerConfig>,
    /// Local media store for uploads and tour media cleanup.
    pub media: Arc<MediaStore>,
}

impl AppState {
    pub fn new(pool: panotour_db::DbPool, config: ServerConfig) -> Self {
        let media = MediaStore::new(config.upload_dir.clone(), config.public_base_url.clone());
        Self {
            pool,
            config: Arc::new(config),
            media: Arc::new(media),
        }
    }
}
