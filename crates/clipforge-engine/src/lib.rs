//! Transform Engine Adapter
//!
//! Wraps ffmpeg/ffprobe subprocesses behind the `TransformEngine` trait:
//! one operation per transformation kind, each taking input path(s) plus
//! typed parameters and returning a freshly generated output path.
//! Operations never overwrite their input; every video output gets the
//! faststart flag so partial downloads can start playback.

mod args;
mod escape;
mod ffmpeg;
mod probe;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use clipforge_core::models::{
    ExportFormat, FilterParams, ImageOverlayParams, Resolution, TextOverlayParams, TrimParams,
    VideoProbe,
};

pub use escape::escape_drawtext;
pub use ffmpeg::FfmpegEngine;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The engine exited abnormally or produced no output. `detail`
    /// carries the raw stderr diagnostic for operator logs.
    #[error("{operation} failed: {detail}")]
    Failed {
        operation: &'static str,
        detail: String,
    },

    /// Concat-by-copy refused the input clips. Stream-copy merging
    /// requires matching codecs and parameters; re-encoding is never
    /// done silently.
    #[error("streams cannot be concatenated by copy: {detail}")]
    IncompatibleStreams { detail: String },

    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid engine configuration: {0}")]
    Configuration(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<EngineError> for clipforge_core::AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Failed { operation, detail } => clipforge_core::AppError::Engine {
                operation,
                detail,
            },
            EngineError::IncompatibleStreams { detail } => {
                clipforge_core::AppError::IncompatibleStreams(detail)
            }
            EngineError::Spawn { program, source } => clipforge_core::AppError::Engine {
                operation: "spawn",
                detail: format!("{}: {}", program, source),
            },
            EngineError::Configuration(msg) => clipforge_core::AppError::Internal(msg),
            EngineError::Io(e) => clipforge_core::AppError::Storage(e.to_string()),
        }
    }
}

/// The external transformation engine, seen as a black box: given input
/// path(s) and a typed option set, produce an output file or fail.
#[async_trait]
pub trait TransformEngine: Send + Sync {
    /// Clip `[start, end)`; `end <= start` skips the duration clause.
    async fn trim(&self, input: &Path, params: &TrimParams) -> EngineResult<PathBuf>;

    async fn color_filter(&self, input: &Path, params: &FilterParams) -> EngineResult<PathBuf>;

    async fn text_overlay(&self, input: &Path, params: &TextOverlayParams)
        -> EngineResult<PathBuf>;

    async fn image_overlay(
        &self,
        video: &Path,
        image: &Path,
        params: &ImageOverlayParams,
    ) -> EngineResult<PathBuf>;

    /// Strip the audio stream; the video stream is copied untouched.
    async fn mute(&self, input: &Path) -> EngineResult<PathBuf>;

    /// Keep the video stream, take audio entirely from the second input;
    /// output duration is the shorter of the two.
    async fn replace_audio(&self, video: &Path, audio: &Path) -> EngineResult<PathBuf>;

    /// Concatenate clips in list order by stream copy.
    async fn merge(&self, clips: &[PathBuf], format: ExportFormat) -> EngineResult<PathBuf>;

    async fn transcode(
        &self,
        input: &Path,
        format: ExportFormat,
        resolution: Resolution,
    ) -> EngineResult<PathBuf>;

    /// Scale video timestamps by `1/factor` and adjust audio tempo to
    /// match, pitch-preserving. `factor` is already confined to the
    /// single-stage atempo range.
    async fn change_speed(&self, input: &Path, factor: f64) -> EngineResult<PathBuf>;

    async fn probe(&self, input: &Path) -> EngineResult<VideoProbe>;
}
