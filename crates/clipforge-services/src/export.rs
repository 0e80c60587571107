//! Staged export: optional steps in fixed order, one intermediate file
//! per step, all intermediates removed before the call returns.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use clipforge_core::models::{AssetDto, AssetKind, ExportFormat, ExportOperations, Resolution};
use clipforge_core::{AppError, AppResult};

use crate::media::MediaService;

/// One export run: target container, target resolution, and the steps
/// to apply. Steps always run in the fixed pipeline order regardless of
/// request field order.
#[derive(Debug, Clone, Default)]
pub struct ExportRequest {
    pub format: Option<ExportFormat>,
    pub resolution: Resolution,
    pub operations: ExportOperations,
}

impl MediaService {
    /// Run the export pipeline on a video asset and register the result
    /// as a new derived asset. A request with no steps and no container
    /// or resolution change returns the source asset and touches no
    /// files.
    pub async fn export_asset(&self, id: Uuid, request: ExportRequest) -> AppResult<AssetDto> {
        let (asset, source_path) = self.video_input(id).await?;

        let source_container = asset.container();
        let format = match request.format {
            Some(format) => format,
            None => ExportFormat::parse(&source_container).ok_or_else(|| {
                AppError::UnsupportedFormat(source_container.clone())
            })?,
        };
        let needs_transcode =
            format.as_str() != source_container || request.resolution != Resolution::Original;

        if request.operations.is_empty() && !needs_transcode {
            tracing::info!(asset_id = %id, "Export is a no-op, returning source asset");
            return Ok(self.enrich(asset).await);
        }

        validate_operations(&request.operations)?;

        // Resolve referenced assets before producing any file, so a bad
        // reference fails with nothing to clean up.
        let image_path = match &request.operations.image_overlay {
            Some(overlay) => Some(
                self.kind_input(overlay.image_asset_id, AssetKind::Image)
                    .await?,
            ),
            None => None,
        };
        let audio_path = match &request.operations.replace_audio {
            Some(replace) => Some(
                self.kind_input(replace.audio_asset_id, AssetKind::Audio)
                    .await?,
            ),
            None => None,
        };

        let mut produced: Vec<PathBuf> = Vec::new();
        let result = self
            .run_steps(
                &source_path,
                &request,
                image_path.as_deref(),
                audio_path.as_deref(),
                format,
                needs_transcode,
                &mut produced,
            )
            .await;

        match result {
            Ok(final_path) => {
                cleanup(produced.iter().filter(|p| *p != &final_path)).await;
                let display_name = asset.derived_name("export", Some(format.as_str()));
                let registered = self
                    .register_generated(&final_path, &asset, display_name)
                    .await;
                match registered {
                    Ok(new_asset) => {
                        tracing::info!(
                            asset_id = %id,
                            export_id = %new_asset.id,
                            format = %format,
                            steps = produced.len(),
                            "Export complete"
                        );
                        Ok(self.enrich(new_asset).await)
                    }
                    Err(e) => {
                        cleanup(std::iter::once(&final_path)).await;
                        Err(e)
                    }
                }
            }
            Err(e) => {
                cleanup(produced.iter()).await;
                Err(e)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn run_steps(
        &self,
        source: &Path,
        request: &ExportRequest,
        image: Option<&Path>,
        audio: Option<&Path>,
        format: ExportFormat,
        needs_transcode: bool,
        produced: &mut Vec<PathBuf>,
    ) -> AppResult<PathBuf> {
        let ops = &request.operations;
        let mut working = source.to_path_buf();

        if let Some(trim) = &ops.trim {
            working = self.engine().trim(&working, trim).await?;
            produced.push(working.clone());
        }
        if let Some(filter) = &ops.filter {
            working = self.engine().color_filter(&working, filter).await?;
            produced.push(working.clone());
        }
        for overlay in &ops.text_overlays {
            working = self.engine().text_overlay(&working, overlay).await?;
            produced.push(working.clone());
        }
        if let Some(overlay) = &ops.image_overlay {
            // Resolved above; present whenever the step is requested.
            let image = image.ok_or_else(|| {
                AppError::Internal("Image overlay path was not resolved".to_string())
            })?;
            working = self
                .engine()
                .image_overlay(&working, image, &overlay.options)
                .await?;
            produced.push(working.clone());
        }
        if ops.mute {
            working = self.engine().mute(&working).await?;
            produced.push(working.clone());
        }
        if ops.replace_audio.is_some() {
            let audio = audio.ok_or_else(|| {
                AppError::Internal("Replacement audio path was not resolved".to_string())
            })?;
            working = self.engine().replace_audio(&working, audio).await?;
            produced.push(working.clone());
        }
        if needs_transcode {
            working = self
                .engine()
                .transcode(&working, format, request.resolution)
                .await?;
            produced.push(working.clone());
        }

        Ok(working)
    }
}

fn validate_operations(ops: &ExportOperations) -> AppResult<()> {
    if let Some(trim) = &ops.trim {
        if trim.start < 0.0 {
            return Err(AppError::Validation(
                "Trim start must not be negative".to_string(),
            ));
        }
    }
    for overlay in &ops.text_overlays {
        if overlay.text.trim().is_empty() {
            return Err(AppError::Validation(
                "Overlay text must not be empty".to_string(),
            ));
        }
    }
    Ok(())
}

async fn cleanup<'a>(paths: impl Iterator<Item = &'a PathBuf>) {
    for path in paths {
        if let Err(e) = tokio::fs::remove_file(path).await {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove intermediate");
        }
    }
}
