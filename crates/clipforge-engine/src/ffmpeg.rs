//! ffmpeg-backed implementation of `TransformEngine`.
//!
//! Each operation builds its argument vector, spawns ffmpeg with
//! `kill_on_drop` (an aborted request kills the child process, which is
//! then treated as a normal failure for cleanup purposes), and maps a
//! non-zero exit to `EngineError::Failed` carrying the stderr
//! diagnostic.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use uuid::Uuid;

use clipforge_core::models::{
    ExportFormat, FilterParams, ImageOverlayParams, Resolution, TextOverlayParams, TrimParams,
    VideoProbe,
};
use clipforge_storage::MediaStore;

use crate::args;
use crate::probe::{parse_probe_output, PROBE_ARGS};
use crate::{EngineError, EngineResult, TransformEngine};

/// Characters that must never appear in a configured binary path.
const DANGEROUS_CHARS: &[char] = &[';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];

fn validate_binary_path(path: &str) -> EngineResult<()> {
    if path.chars().any(|c| DANGEROUS_CHARS.contains(&c)) {
        return Err(EngineError::Configuration(format!(
            "binary path contains dangerous characters: {}",
            path
        )));
    }
    Ok(())
}

/// Keep the tail of a diagnostic; ffmpeg stderr includes the banner and
/// progress lines, the failure reason is at the end.
fn diagnostic(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let trimmed = text.trim();
    const MAX: usize = 2000;
    if trimmed.len() > MAX {
        let cut = trimmed.len() - MAX;
        let mut start = cut;
        while !trimmed.is_char_boundary(start) {
            start += 1;
        }
        format!("...{}", &trimmed[start..])
    } else {
        trimmed.to_string()
    }
}

pub struct FfmpegEngine {
    ffmpeg_path: String,
    ffprobe_path: String,
    store: MediaStore,
}

impl FfmpegEngine {
    pub fn new(
        ffmpeg_path: impl Into<String>,
        ffprobe_path: impl Into<String>,
        store: MediaStore,
    ) -> EngineResult<Self> {
        let ffmpeg_path = ffmpeg_path.into();
        let ffprobe_path = ffprobe_path.into();
        validate_binary_path(&ffmpeg_path)?;
        validate_binary_path(&ffprobe_path)?;
        Ok(FfmpegEngine {
            ffmpeg_path,
            ffprobe_path,
            store,
        })
    }

    /// Fresh output path carrying the input's container extension.
    fn output_like(&self, input: &Path) -> PathBuf {
        let ext = input
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_else(|| "mp4".to_string());
        self.store.generate_output_path(&ext)
    }

    async fn run_ffmpeg(
        &self,
        operation: &'static str,
        cmd_args: &[String],
        output: &Path,
    ) -> EngineResult<()> {
        let start = std::time::Instant::now();
        tracing::debug!(operation, args = ?cmd_args, "Invoking ffmpeg");

        let result = Command::new(&self.ffmpeg_path)
            .args(cmd_args)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| EngineError::Spawn {
                program: self.ffmpeg_path.clone(),
                source: e,
            })?;

        if !result.status.success() {
            return Err(EngineError::Failed {
                operation,
                detail: diagnostic(&result.stderr),
            });
        }

        if !tokio::fs::try_exists(output).await.unwrap_or(false) {
            return Err(EngineError::Failed {
                operation,
                detail: "engine exited successfully but produced no output file".to_string(),
            });
        }

        tracing::info!(
            operation,
            output = %output.display(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "ffmpeg operation complete"
        );
        Ok(())
    }
}

#[async_trait]
impl TransformEngine for FfmpegEngine {
    async fn trim(&self, input: &Path, params: &TrimParams) -> EngineResult<PathBuf> {
        let output = self.output_like(input);
        self.run_ffmpeg("trim", &args::trim_args(input, &output, params), &output)
            .await?;
        Ok(output)
    }

    async fn color_filter(&self, input: &Path, params: &FilterParams) -> EngineResult<PathBuf> {
        let output = self.output_like(input);
        self.run_ffmpeg(
            "filter",
            &args::color_filter_args(input, &output, params),
            &output,
        )
        .await?;
        Ok(output)
    }

    async fn text_overlay(
        &self,
        input: &Path,
        params: &TextOverlayParams,
    ) -> EngineResult<PathBuf> {
        let output = self.output_like(input);
        self.run_ffmpeg(
            "text-overlay",
            &args::text_overlay_args(input, &output, params),
            &output,
        )
        .await?;
        Ok(output)
    }

    async fn image_overlay(
        &self,
        video: &Path,
        image: &Path,
        params: &ImageOverlayParams,
    ) -> EngineResult<PathBuf> {
        let output = self.output_like(video);
        self.run_ffmpeg(
            "image-overlay",
            &args::image_overlay_args(video, image, &output, params),
            &output,
        )
        .await?;
        Ok(output)
    }

    async fn mute(&self, input: &Path) -> EngineResult<PathBuf> {
        let output = self.output_like(input);
        self.run_ffmpeg("mute", &args::mute_args(input, &output), &output)
            .await?;
        Ok(output)
    }

    async fn replace_audio(&self, video: &Path, audio: &Path) -> EngineResult<PathBuf> {
        let output = self.output_like(video);
        self.run_ffmpeg(
            "replace-audio",
            &args::replace_audio_args(video, audio, &output),
            &output,
        )
        .await?;
        Ok(output)
    }

    async fn merge(&self, clips: &[PathBuf], format: ExportFormat) -> EngineResult<PathBuf> {
        let list_file =
            std::env::temp_dir().join(format!("clipforge-merge-{}.txt", Uuid::new_v4()));
        tokio::fs::write(&list_file, args::concat_list_contents(clips)).await?;

        let output = self.store.generate_output_path(format.as_str());
        let result = self
            .run_ffmpeg("merge", &args::merge_args(&list_file, &output), &output)
            .await;

        if let Err(e) = tokio::fs::remove_file(&list_file).await {
            tracing::warn!(path = %list_file.display(), error = %e, "Failed to remove concat list file");
        }

        // Stream-copy concat refuses mismatched codecs/parameters; surface
        // that distinctly so callers can consider re-encoding.
        match result {
            Ok(()) => Ok(output),
            Err(EngineError::Failed { detail, .. }) => {
                Err(EngineError::IncompatibleStreams { detail })
            }
            Err(e) => Err(e),
        }
    }

    async fn transcode(
        &self,
        input: &Path,
        format: ExportFormat,
        resolution: Resolution,
    ) -> EngineResult<PathBuf> {
        let output = self.store.generate_output_path(format.as_str());
        self.run_ffmpeg(
            "transcode",
            &args::transcode_args(input, &output, format, resolution),
            &output,
        )
        .await?;
        Ok(output)
    }

    async fn change_speed(&self, input: &Path, factor: f64) -> EngineResult<PathBuf> {
        let output = self.output_like(input);
        self.run_ffmpeg(
            "speed",
            &args::speed_args(input, &output, factor),
            &output,
        )
        .await?;
        Ok(output)
    }

    async fn probe(&self, input: &Path) -> EngineResult<VideoProbe> {
        let result = Command::new(&self.ffprobe_path)
            .args(PROBE_ARGS)
            .arg(input)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| EngineError::Spawn {
                program: self.ffprobe_path.clone(),
                source: e,
            })?;

        if !result.status.success() {
            return Err(EngineError::Failed {
                operation: "probe",
                detail: diagnostic(&result.stderr),
            });
        }

        parse_probe_output(&result.stdout).map_err(|e| EngineError::Failed {
            operation: "probe",
            detail: format!("unparseable ffprobe output: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_rejects_dangerous_binary_path() {
        let dir = tempdir().unwrap();
        let store = MediaStore::new(dir.path()).await.unwrap();
        let result = FfmpegEngine::new("ffmpeg; rm -rf /", "ffprobe", store);
        assert!(matches!(result, Err(EngineError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_output_path_keeps_input_extension() {
        let dir = tempdir().unwrap();
        let store = MediaStore::new(dir.path()).await.unwrap();
        let engine = FfmpegEngine::new("ffmpeg", "ffprobe", store).unwrap();

        let output = engine.output_like(Path::new("/in/clip.WEBM"));
        assert_eq!(output.extension().unwrap(), "webm");

        let output = engine.output_like(Path::new("/in/noext"));
        assert_eq!(output.extension().unwrap(), "mp4");
    }

    #[test]
    fn test_diagnostic_keeps_tail() {
        let long = "x".repeat(3000) + " final error line";
        let d = diagnostic(long.as_bytes());
        assert!(d.starts_with("..."));
        assert!(d.ends_with("final error line"));
        assert!(d.len() <= 2003);
    }
}
