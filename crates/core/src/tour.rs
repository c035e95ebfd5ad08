//! Tour aggregate records and their validation.
//!
//! A tour is a named set of panoramas (scenes) plus the hotspots placed on
//! them. Hotspots come in two flavours: infospots surface text/image/video
//! content, linkspots jump to another panorama of the same tour. A
//! bidirectional link is modelled as two independent linkspots.
//!
//! All records use camelCase field names on the wire to match the editor
//! front-end.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError};

use crate::error::CoreError;

/// Default hotspot display size used by the editor.
pub const DEFAULT_SPOT_SIZE: f64 = 300.0;

/// Longest accepted tour name, in characters.
pub const MAX_TOUR_NAME_LEN: usize = 200;

/// 3D position of a hotspot inside the panorama sphere.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// One 360° scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Panorama {
    #[serde(deserialize_with = "string_or_number")]
    #[validate(length(min = 1, message = "panoId must not be empty"))]
    pub pano_id: String,
    #[validate(length(min = 1, message = "imageUrl must not be empty"))]
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A clickable marker surfacing text, image or video content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Infospot {
    #[serde(deserialize_with = "string_or_number")]
    #[validate(length(min = 1, message = "infospotId must not be empty"))]
    pub infospot_id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub pano_id: String,
    pub position: Position,
    #[serde(default = "default_spot_size")]
    #[validate(range(exclusive_min = 0.0, message = "size must be positive"))]
    pub size: f64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub img: Option<String>,
    #[serde(default)]
    pub video: Option<String>,
}

/// A clickable marker navigating to another panorama of the same tour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Linkspot {
    #[serde(deserialize_with = "string_or_number")]
    #[validate(length(min = 1, message = "linkspotId must not be empty"))]
    pub linkspot_id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub pano_id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub target_pano_id: String,
    pub position: Position,
    #[serde(default = "default_spot_size")]
    #[validate(range(exclusive_min = 0.0, message = "size must be positive"))]
    pub size: f64,
    #[serde(default)]
    pub text: String,
}

/// Full snapshot of a tour's editable content.
///
/// Used both for creation and for replace-on-update. Any `tourId` sent by
/// the client is ignored; ids are allocated server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TourInput {
    #[validate(
        length(min = 1, message = "name is required"),
        custom(function = "name_within_limit")
    )]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub panoramas: Vec<Panorama>,
    #[serde(default)]
    #[validate(nested)]
    pub infospots: Vec<Infospot>,
    #[serde(default)]
    #[validate(nested)]
    pub linkspots: Vec<Linkspot>,
}

impl TourInput {
    /// Run field-level validation and the panorama cross-reference checks.
    ///
    /// Returns the input unchanged (with a trimmed name) when valid.
    pub fn validated(mut self) -> Result<Self, CoreError> {
        self.name = self.name.trim().to_string();
        self.validate()?;
        self.check_references()?;
        Ok(self)
    }

    /// Every hotspot must sit on, and every linkspot must target, a panorama
    /// of this tour. Panorama ids must be unique and hotspot positions finite.
    pub fn check_references(&self) -> Result<(), CoreError> {
        let mut pano_ids = HashSet::with_capacity(self.panoramas.len());
        for pano in &self.panoramas {
            if !pano_ids.insert(pano.pano_id.as_str()) {
                return Err(CoreError::Validation(format!(
                    "Duplicate panorama id '{}'",
                    pano.pano_id
                )));
            }
        }

        for spot in &self.infospots {
            if !spot.position.is_finite() {
                return Err(CoreError::Validation(format!(
                    "Infospot '{}' has a non-finite position",
                    spot.infospot_id
                )));
            }
            if !pano_ids.contains(spot.pano_id.as_str()) {
                return Err(CoreError::Validation(format!(
                    "Infospot '{}' references unknown panorama '{}'",
                    spot.infospot_id, spot.pano_id
                )));
            }
        }

        for spot in &self.linkspots {
            if !spot.position.is_finite() {
                return Err(CoreError::Validation(format!(
                    "Linkspot '{}' has a non-finite position",
                    spot.linkspot_id
                )));
            }
            if !pano_ids.contains(spot.pano_id.as_str()) {
                return Err(CoreError::Validation(format!(
                    "Linkspot '{}' references unknown panorama '{}'",
                    spot.linkspot_id, spot.pano_id
                )));
            }
            if !pano_ids.contains(spot.target_pano_id.as_str()) {
                return Err(CoreError::Validation(format!(
                    "Linkspot '{}' targets unknown panorama '{}'",
                    spot.linkspot_id, spot.target_pano_id
                )));
            }
        }

        Ok(())
    }

    pub fn description_or_empty(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

/// Collect every non-empty media URL referenced by a tour's panoramas
/// (`imageUrl`) and infospots (`img`, `video`), in that order.
pub fn media_urls<'a>(panoramas: &'a [Panorama], infospots: &'a [Infospot]) -> Vec<&'a str> {
    let pano_urls = panoramas.iter().map(|p| p.image_url.as_str());
    let img_urls = infospots.iter().filter_map(|s| s.img.as_deref());
    let video_urls = infospots.iter().filter_map(|s| s.video.as_deref());

    pano_urls
        .chain(img_urls)
        .chain(video_urls)
        .filter(|url| !url.trim().is_empty())
        .collect()
}

fn name_within_limit(name: &str) -> Result<(), ValidationError> {
    if name.chars().count() > MAX_TOUR_NAME_LEN {
        return Err(ValidationError::new("length").with_message(
            format!("name must be at most {MAX_TOUR_NAME_LEN} characters").into(),
        ));
    }
    Ok(())
}

fn default_spot_size() -> f64 {
    DEFAULT_SPOT_SIZE
}

/// The editor generates some ids as numbers (`Date.now()`), others as
/// strings. Both are stored as strings.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(f) => f.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn sample_input() -> serde_json::Value {
        json!({
            "name": "Campus",
            "description": "Main campus walk",
            "panoramas": [
                { "panoId": "pano_1", "imageUrl": "http://localhost:8000/panoramas/a.jpg", "name": "Gate" },
                { "panoId": "pano_2", "imageUrl": "http://localhost:8000/panoramas/b.jpg" }
            ],
            "infospots": [
                {
                    "infospotId": 1712000000000_i64,
                    "panoId": "pano_1",
                    "position": { "x": 10.0, "y": -2.5, "z": -5000.0 },
                    "size": 300,
                    "text": "Library",
                    "img": "http://localhost:8000/images/lib.png",
                    "video": null
                }
            ],
            "linkspots": [
                {
                    "linkspotId": "link_1",
                    "panoId": "pano_1",
                    "targetPanoId": "pano_2",
                    "position": { "x": 0, "y": 0, "z": -5000 },
                    "size": 300,
                    "text": "To scene 2"
                },
                {
                    "linkspotId": "link_1_back",
                    "panoId": "pano_2",
                    "targetPanoId": "pano_1",
                    "position": { "x": 0, "y": 0, "z": 5000 },
                    "size": 300,
                    "text": "Back"
                }
            ]
        })
    }

    fn parse(value: serde_json::Value) -> TourInput {
        serde_json::from_value(value).expect("input should deserialize")
    }

    #[test]
    fn valid_tour_passes() {
        let input = parse(sample_input()).validated().expect("should be valid");
        assert_eq!(input.panoramas.len(), 2);
        assert_eq!(input.infospots[0].infospot_id, "1712000000000");
        assert_eq!(input.linkspots.len(), 2);
    }

    #[test]
    fn missing_arrays_default_to_empty() {
        let input = parse(json!({ "name": "Empty" })).validated().unwrap();
        assert!(input.panoramas.is_empty());
        assert!(input.infospots.is_empty());
        assert!(input.linkspots.is_empty());
        assert_eq!(input.description_or_empty(), "");
    }

    #[test]
    fn blank_name_is_rejected() {
        let result = parse(json!({ "name": "   " })).validated();
        assert_matches!(result, Err(CoreError::Validation(msg)) if msg.contains("name is required"));
    }

    #[test]
    fn overlong_name_reports_the_limit() {
        let long = "x".repeat(MAX_TOUR_NAME_LEN + 1);
        let result = parse(json!({ "name": long })).validated();
        assert_matches!(
            result,
            Err(CoreError::Validation(msg))
                if msg.contains("at most 200") && !msg.contains("required")
        );

        let longest = "é".repeat(MAX_TOUR_NAME_LEN);
        assert!(parse(json!({ "name": longest })).validated().is_ok());
    }

    #[test]
    fn linkspot_to_unknown_panorama_is_rejected() {
        let mut value = sample_input();
        value["linkspots"][0]["targetPanoId"] = json!("pano_9");
        let result = parse(value).validated();
        assert_matches!(result, Err(CoreError::Validation(msg)) if msg.contains("pano_9"));
    }

    #[test]
    fn infospot_on_unknown_panorama_is_rejected() {
        let mut value = sample_input();
        value["infospots"][0]["panoId"] = json!("ghost");
        let result = parse(value).validated();
        assert_matches!(result, Err(CoreError::Validation(msg)) if msg.contains("ghost"));
    }

    #[test]
    fn duplicate_panorama_ids_are_rejected() {
        let mut value = sample_input();
        value["panoramas"][1]["panoId"] = json!("pano_1");
        let result = parse(value).validated();
        assert_matches!(result, Err(CoreError::Validation(msg)) if msg.contains("Duplicate"));
    }

    #[test]
    fn non_positive_size_is_rejected() {
        let mut value = sample_input();
        value["infospots"][0]["size"] = json!(0);
        assert_matches!(parse(value).validated(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn empty_image_url_is_rejected() {
        let mut value = sample_input();
        value["panoramas"][0]["imageUrl"] = json!("");
        assert_matches!(parse(value).validated(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn media_urls_skip_empty_entries() {
        let mut value = sample_input();
        value["infospots"][0]["video"] = json!("");
        let input = parse(value);
        let urls = media_urls(&input.panoramas, &input.infospots);
        assert_eq!(
            urls,
            vec![
                "http://localhost:8000/panoramas/a.jpg",
                "http://localhost:8000/panoramas/b.jpg",
                "http://localhost:8000/images/lib.png",
            ]
        );
    }

    #[test]
    fn serializes_with_camel_case_names() {
        let input = parse(sample_input());
        let value = serde_json::to_value(&input.linkspots[0]).unwrap();
        assert_eq!(value["targetPanoId"], "pano_2");
        assert_eq!(value["linkspotId"], "link_1");
    }
}
