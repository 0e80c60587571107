//! Media-type constants: MIME allowlists, extension fallbacks, export
//! formats, and the fixed resolution filter table.

/// MIME types accepted as video uploads.
pub const VIDEO_MIME_TYPES: &[&str] = &[
    "video/mp4",
    "video/webm",
    "video/quicktime",
    "video/x-matroska",
];

/// MIME types accepted as audio uploads.
pub const AUDIO_MIME_TYPES: &[&str] = &[
    "audio/mpeg",
    "audio/mp3",
    "audio/wav",
    "audio/x-wav",
    "audio/ogg",
    "audio/webm",
    "audio/aac",
];

/// MIME types accepted as image uploads.
pub const IMAGE_MIME_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/jpg",
    "image/webp",
    "image/gif",
];

pub const VIDEO_EXTENSIONS: &[&str] = &[".mp4", ".mov", ".webm", ".mkv"];
pub const AUDIO_EXTENSIONS: &[&str] = &[".mp3", ".wav", ".ogg", ".aac", ".webm"];
pub const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".webp", ".gif"];

/// Extension to MIME fallback, used when an upload arrives as
/// application/octet-stream and for generated artifacts.
pub const EXTENSION_MIME_OVERRIDES: &[(&str, &str)] = &[
    (".mp4", "video/mp4"),
    (".mov", "video/quicktime"),
    (".webm", "video/webm"),
    (".mkv", "video/x-matroska"),
    (".mp3", "audio/mpeg"),
    (".wav", "audio/wav"),
    (".ogg", "audio/ogg"),
    (".aac", "audio/aac"),
    (".png", "image/png"),
    (".jpg", "image/jpeg"),
    (".jpeg", "image/jpeg"),
    (".webp", "image/webp"),
    (".gif", "image/gif"),
];

/// Containers the export pipeline can produce.
pub const EXPORT_FORMATS: &[&str] = &["mp4", "webm", "mov"];

/// Fixed scale filters per target resolution. `-2` keeps the aspect
/// ratio while forcing an even width, which the H.264 encoder requires.
pub const RESOLUTION_FILTERS: &[(&str, &str)] = &[
    ("480p", "scale=-2:480"),
    ("720p", "scale=-2:720"),
    ("1080p", "scale=-2:1080"),
];

/// Playback speed bounds; atempo supports [0.5, 2.0] in a single stage.
pub const SPEED_FACTOR_MIN: f64 = 0.5;
pub const SPEED_FACTOR_MAX: f64 = 2.0;

/// Below this distance from 1.0 a speed change is treated as identity.
pub const SPEED_IDENTITY_EPSILON: f64 = 0.001;

/// Look up the fallback MIME type for a lowercase extension (with dot).
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    EXTENSION_MIME_OVERRIDES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, m)| *m)
}

/// Infer a MIME type from a file name, defaulting to octet-stream.
pub fn guess_mime(file_name: &str) -> &'static str {
    let ext = file_name
        .rfind('.')
        .map(|i| file_name[i..].to_ascii_lowercase())
        .unwrap_or_default();
    mime_for_extension(&ext).unwrap_or("application/octet-stream")
}
