//! Tour aggregate row.

use panotour_core::tour::{media_urls, Infospot, Linkspot, Panorama};
use panotour_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// Full row from the `tours` table.
///
/// Serializes to the public tour projection: the internal `id` is skipped
/// and the JSONB columns render as plain arrays.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tour {
    #[serde(skip)]
    pub id: DbId,
    pub tour_id: String,
    pub name: String,
    pub description: String,
    pub panoramas: Json<Vec<Panorama>>,
    pub infospots: Json<Vec<Infospot>>,
    pub linkspots: Json<Vec<Linkspot>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Tour {
    /// Every non-empty media URL this tour references.
    pub fn media_urls(&self) -> Vec<&str> {
        media_urls(&self.panoramas.0, &self.infospots.0)
    }
}
