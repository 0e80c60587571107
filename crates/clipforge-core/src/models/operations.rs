//! Typed parameters for each transformation operation.
//!
//! Every operation carries a concrete struct validated at the API
//! boundary; the pipeline never threads open-ended JSON maps.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::RESOLUTION_FILTERS;

/// Clip `[start, end)`. A missing `end` clips to the end of stream; an
/// `end <= start` deliberately skips the duration clause and passes the
/// full remainder through.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimParams {
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub end: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Brightness,
    Contrast,
    Saturation,
    Grayscale,
    /// Combined eq expression; also the fallback for unrecognized kinds.
    #[serde(other)]
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterParams {
    #[serde(rename = "filterType")]
    pub kind: FilterKind,
    #[serde(default)]
    pub brightness: f64,
    #[serde(default = "default_one")]
    pub contrast: f64,
    #[serde(default = "default_one")]
    pub saturation: f64,
}

fn default_one() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextOverlayParams {
    pub text: String,
    #[serde(default = "default_font_color")]
    pub font_color: String,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    /// Pixel offset or drawtext position expression, passed through.
    #[serde(default = "default_text_x")]
    pub x: String,
    #[serde(default = "default_text_y")]
    pub y: String,
    #[serde(default, rename = "box")]
    pub box_enabled: bool,
    #[serde(default = "default_box_color")]
    pub box_color: String,
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub end: Option<f64>,
}

fn default_font_color() -> String {
    "white".to_string()
}

fn default_font_size() -> u32 {
    36
}

fn default_text_x() -> String {
    "(w-text_w)/2".to_string()
}

fn default_text_y() -> String {
    "(h-text_h)/2".to_string()
}

fn default_box_color() -> String {
    "black@0.5".to_string()
}

impl Default for TextOverlayParams {
    fn default() -> Self {
        TextOverlayParams {
            text: String::new(),
            font_color: default_font_color(),
            font_size: default_font_size(),
            x: default_text_x(),
            y: default_text_y(),
            box_enabled: false,
            box_color: default_box_color(),
            start: 0.0,
            end: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageOverlayParams {
    /// Pixel offset or overlay position expression, passed through.
    #[serde(default = "default_overlay_offset")]
    pub x: String,
    #[serde(default = "default_overlay_offset")]
    pub y: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub opacity: Option<f64>,
    #[serde(default)]
    pub start: Option<f64>,
    #[serde(default)]
    pub end: Option<f64>,
}

fn default_overlay_offset() -> String {
    "10".to_string()
}

impl Default for ImageOverlayParams {
    fn default() -> Self {
        ImageOverlayParams {
            x: default_overlay_offset(),
            y: default_overlay_offset(),
            width: None,
            height: None,
            opacity: None,
            start: None,
            end: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedParams {
    #[serde(alias = "speed")]
    pub factor: f64,
}

/// Export target container. The supported set is closed; anything else
/// fails with `UnsupportedFormat` before the pipeline starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Mp4,
    Webm,
    Mov,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Mp4 => "mp4",
            ExportFormat::Webm => "webm",
            ExportFormat::Mov => "mov",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "mp4" => Some(ExportFormat::Mp4),
            "webm" => Some(ExportFormat::Webm),
            "mov" => Some(ExportFormat::Mov),
            _ => None,
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Resolution {
    #[default]
    #[serde(rename = "original")]
    Original,
    #[serde(rename = "480p")]
    R480p,
    #[serde(rename = "720p")]
    R720p,
    #[serde(rename = "1080p")]
    R1080p,
}

impl Resolution {
    /// Scale filter for this target, or `None` to keep the source size.
    pub fn scale_filter(self) -> Option<&'static str> {
        let name = match self {
            Resolution::Original => return None,
            Resolution::R480p => "480p",
            Resolution::R720p => "720p",
            Resolution::R1080p => "1080p",
        };
        RESOLUTION_FILTERS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, f)| *f)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageOverlayRef {
    pub image_asset_id: Uuid,
    #[serde(default)]
    pub options: ImageOverlayParams,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceAudioRef {
    pub audio_asset_id: Uuid,
}

/// The optional steps of one export run, applied in fixed order:
/// trim, filter, text overlays (list order), image overlay, mute,
/// replace audio, then transcode if format or resolution differ.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOperations {
    #[serde(default)]
    pub trim: Option<TrimParams>,
    #[serde(default)]
    pub filter: Option<FilterParams>,
    #[serde(default)]
    pub text_overlays: Vec<TextOverlayParams>,
    #[serde(default)]
    pub image_overlay: Option<ImageOverlayRef>,
    #[serde(default)]
    pub mute: bool,
    #[serde(default)]
    pub replace_audio: Option<ReplaceAudioRef>,
}

impl ExportOperations {
    pub fn is_empty(&self) -> bool {
        self.trim.is_none()
            && self.filter.is_none()
            && self.text_overlays.is_empty()
            && self.image_overlay.is_none()
            && !self.mute
            && self.replace_audio.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_kind_unknown_falls_back_to_custom() {
        let params: FilterParams =
            serde_json::from_str(r#"{"filterType":"sepia","brightness":0.2}"#).unwrap();
        assert_eq!(params.kind, FilterKind::Custom);
        assert_eq!(params.brightness, 0.2);
        assert_eq!(params.contrast, 1.0);
        assert_eq!(params.saturation, 1.0);
    }

    #[test]
    fn test_text_overlay_defaults() {
        let params: TextOverlayParams = serde_json::from_str(r#"{"text":"Hi"}"#).unwrap();
        assert_eq!(params.font_color, "white");
        assert_eq!(params.font_size, 36);
        assert_eq!(params.x, "(w-text_w)/2");
        assert!(!params.box_enabled);
        assert_eq!(params.end, None);
    }

    #[test]
    fn test_export_format_parse() {
        assert_eq!(ExportFormat::parse("MP4"), Some(ExportFormat::Mp4));
        assert_eq!(ExportFormat::parse("webm"), Some(ExportFormat::Webm));
        assert_eq!(ExportFormat::parse("avi"), None);
    }

    #[test]
    fn test_resolution_scale_filter() {
        assert_eq!(Resolution::Original.scale_filter(), None);
        assert_eq!(Resolution::R720p.scale_filter(), Some("scale=-2:720"));
    }

    #[test]
    fn test_export_operations_is_empty() {
        assert!(ExportOperations::default().is_empty());
        let ops = ExportOperations {
            mute: true,
            ..Default::default()
        };
        assert!(!ops.is_empty());
    }

    #[test]
    fn test_speed_params_alias() {
        let params: SpeedParams = serde_json::from_str(r#"{"speed":1.5}"#).unwrap();
        assert_eq!(params.factor, 1.5);
    }
}
