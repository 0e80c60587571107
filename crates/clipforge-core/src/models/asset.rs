//! Asset records and their outward projection.
//!
//! An `Asset` is one artifact on disk, uploaded or generated. The record is
//! what the registry persists; `AssetDto` is the projection handed to
//! clients, carrying the derived URL and (for videos) on-demand probe
//! metadata that is never stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{AUDIO_MIME_TYPES, IMAGE_MIME_TYPES, VIDEO_MIME_TYPES};

use super::probe::VideoProbe;

/// Media family of an asset, derived from the MIME type at creation
/// and never recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Video,
    Audio,
    Image,
    Binary,
}

impl AssetKind {
    pub fn from_mime(mime_type: &str) -> Self {
        if VIDEO_MIME_TYPES.contains(&mime_type) {
            AssetKind::Video
        } else if AUDIO_MIME_TYPES.contains(&mime_type) {
            AssetKind::Audio
        } else if IMAGE_MIME_TYPES.contains(&mime_type) {
            AssetKind::Image
        } else {
            AssetKind::Binary
        }
    }

    /// Human-readable phrase for kind-mismatch errors.
    pub fn expected_phrase(self) -> &'static str {
        match self {
            AssetKind::Video => "a video",
            AssetKind::Audio => "an audio file",
            AssetKind::Image => "an image",
            AssetKind::Binary => "a binary file",
        }
    }
}

/// One registered artifact. Persisted in the registry snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: Uuid,
    pub original_name: String,
    /// Backing file name in the artifact store; unique, immutable.
    pub stored_name: String,
    pub mime_type: String,
    pub kind: AssetKind,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Lineage pointer for generated assets (first clip for merges).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived_from: Option<Uuid>,
}

impl Asset {
    /// Extension of the backing file, with dot, defaulting to `.mp4`.
    pub fn extension(&self) -> String {
        match self.stored_name.rfind('.') {
            Some(i) => self.stored_name[i..].to_ascii_lowercase(),
            None => ".mp4".to_string(),
        }
    }

    /// Container format of the backing file, without dot (e.g. `mp4`).
    pub fn container(&self) -> String {
        self.extension().trim_start_matches('.').to_string()
    }

    /// Lineage name for a generated artifact: the source display name minus
    /// its extension, plus an operation suffix (e.g. `clip-trimmed.mp4`).
    pub fn derived_name(&self, suffix: &str, extension_override: Option<&str>) -> String {
        let base = match self.original_name.rfind('.') {
            Some(i) if i > 0 => &self.original_name[..i],
            _ => self.original_name.as_str(),
        };
        let extension = match extension_override {
            Some(ext) if ext.starts_with('.') => ext.to_string(),
            Some(ext) => format!(".{}", ext),
            None => self.extension(),
        };
        format!("{}-{}{}", base, suffix, extension)
    }

    pub fn to_dto(&self) -> AssetDto {
        AssetDto {
            id: self.id,
            original_name: self.original_name.clone(),
            filename: self.stored_name.clone(),
            mime_type: self.mime_type.clone(),
            size: self.size_bytes,
            kind: self.kind,
            created_at: self.created_at,
            updated_at: self.updated_at,
            derived_from: self.derived_from,
            url: format!("/media/files/{}", self.stored_name),
            metadata: None,
        }
    }
}

/// Client-facing projection of an asset. `metadata` is filled by
/// enrichment for videos and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDto {
    pub id: Uuid,
    pub original_name: String,
    pub filename: String,
    pub mime_type: String,
    pub size: u64,
    pub kind: AssetKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub derived_from: Option<Uuid>,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<VideoProbe>,
}

/// Fields that may be patched on an existing asset record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetPatch {
    pub original_name: Option<String>,
    pub mime_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_asset(original_name: &str, stored_name: &str) -> Asset {
        Asset {
            id: Uuid::new_v4(),
            original_name: original_name.to_string(),
            stored_name: stored_name.to_string(),
            mime_type: "video/mp4".to_string(),
            kind: AssetKind::Video,
            size_bytes: 1024,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            derived_from: None,
        }
    }

    #[test]
    fn test_kind_from_mime() {
        assert_eq!(AssetKind::from_mime("video/mp4"), AssetKind::Video);
        assert_eq!(AssetKind::from_mime("audio/mpeg"), AssetKind::Audio);
        assert_eq!(AssetKind::from_mime("image/png"), AssetKind::Image);
        assert_eq!(
            AssetKind::from_mime("application/pdf"),
            AssetKind::Binary
        );
    }

    #[test]
    fn test_derived_name() {
        let asset = sample_asset("holiday clip.mp4", "123-abc.mp4");
        assert_eq!(
            asset.derived_name("trimmed", None),
            "holiday clip-trimmed.mp4"
        );
        assert_eq!(
            asset.derived_name("export", Some("webm")),
            "holiday clip-export.webm"
        );
    }

    #[test]
    fn test_derived_name_without_extension() {
        let asset = sample_asset("rawclip", "123-abc");
        assert_eq!(asset.derived_name("muted", None), "rawclip-muted.mp4");
    }

    #[test]
    fn test_dto_url() {
        let asset = sample_asset("a.mp4", "171234-deadbeef.mp4");
        assert_eq!(asset.to_dto().url, "/media/files/171234-deadbeef.mp4");
    }

    #[test]
    fn test_container() {
        let asset = sample_asset("a.MOV", "1-1.MOV");
        assert_eq!(asset.container(), "mov");
    }
}
