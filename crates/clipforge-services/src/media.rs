//! Single-step media operations: upload, listing, lineage transforms.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use uuid::Uuid;

use clipforge_core::constants::{
    guess_mime, SPEED_FACTOR_MAX, SPEED_FACTOR_MIN, SPEED_IDENTITY_EPSILON,
};
use clipforge_core::models::{
    Asset, AssetDto, AssetKind, AssetPatch, ExportFormat, FilterParams, ImageOverlayParams,
    TextOverlayParams, TrimParams,
};
use clipforge_core::{AppError, AppResult};
use clipforge_engine::TransformEngine;
use clipforge_library::{AssetLibrary, NewAsset};
use clipforge_storage::MediaStore;

pub struct MediaService {
    library: Arc<AssetLibrary>,
    engine: Arc<dyn TransformEngine>,
}

impl MediaService {
    pub fn new(library: Arc<AssetLibrary>, engine: Arc<dyn TransformEngine>) -> Self {
        MediaService { library, engine }
    }

    pub fn library(&self) -> &AssetLibrary {
        &self.library
    }

    fn store(&self) -> &MediaStore {
        self.library.store()
    }

    pub(crate) fn engine(&self) -> &dyn TransformEngine {
        self.engine.as_ref()
    }

    /// Store uploaded bytes and register the asset.
    pub async fn upload(
        &self,
        original_name: &str,
        mime_type: &str,
        data: &[u8],
    ) -> AppResult<AssetDto> {
        let stored_name = MediaStore::generate_stored_name(original_name);
        self.store()
            .write(&stored_name, data)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        let asset = self
            .library
            .register(NewAsset {
                original_name: original_name.to_string(),
                stored_name,
                mime_type: mime_type.to_string(),
                derived_from: None,
            })
            .await?;
        Ok(self.enrich(asset).await)
    }

    /// All assets, most recently touched first.
    pub async fn list_assets(&self) -> Vec<AssetDto> {
        let mut assets = self.library.list().await;
        assets.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        assets.into_iter().map(|a| a.to_dto()).collect()
    }

    pub async fn get_asset_details(&self, id: Uuid) -> AppResult<AssetDto> {
        let asset = self.library.get(id).await?;
        Ok(self.enrich(asset).await)
    }

    pub async fn patch_asset(&self, id: Uuid, patch: AssetPatch) -> AppResult<AssetDto> {
        let asset = self.library.patch(id, patch).await?;
        Ok(asset.to_dto())
    }

    pub async fn remove_asset(&self, id: Uuid) -> AppResult<()> {
        self.library.remove(id, true).await?;
        Ok(())
    }

    /// Asset record plus its backing path, for downloads.
    pub async fn resolve_download(&self, id: Uuid) -> AppResult<(Asset, PathBuf)> {
        let asset = self.library.get(id).await?;
        let path = self.library.resolve_path(id).await?;
        Ok((asset, path))
    }

    pub async fn trim_asset(&self, id: Uuid, params: TrimParams) -> AppResult<AssetDto> {
        if params.start < 0.0 {
            return Err(AppError::Validation(
                "Trim start must not be negative".to_string(),
            ));
        }
        let (asset, input) = self.video_input(id).await?;
        let output = self.engine.trim(&input, &params).await?;
        self.finish_transform(output, &asset, asset.derived_name("trimmed", None))
            .await
    }

    pub async fn apply_asset_filter(&self, id: Uuid, params: FilterParams) -> AppResult<AssetDto> {
        let (asset, input) = self.video_input(id).await?;
        let output = self.engine.color_filter(&input, &params).await?;
        self.finish_transform(output, &asset, asset.derived_name("filtered", None))
            .await
    }

    pub async fn add_asset_text(
        &self,
        id: Uuid,
        params: TextOverlayParams,
    ) -> AppResult<AssetDto> {
        if params.text.trim().is_empty() {
            return Err(AppError::Validation(
                "Overlay text must not be empty".to_string(),
            ));
        }
        let (asset, input) = self.video_input(id).await?;
        let output = self.engine.text_overlay(&input, &params).await?;
        self.finish_transform(output, &asset, asset.derived_name("text", None))
            .await
    }

    pub async fn add_asset_image(
        &self,
        video_id: Uuid,
        image_id: Uuid,
        params: ImageOverlayParams,
    ) -> AppResult<AssetDto> {
        let (asset, input) = self.video_input(video_id).await?;
        let image_path = self.kind_input(image_id, AssetKind::Image).await?;
        let output = self
            .engine
            .image_overlay(&input, &image_path, &params)
            .await?;
        self.finish_transform(output, &asset, asset.derived_name("overlay", None))
            .await
    }

    pub async fn mute_asset_audio(&self, id: Uuid) -> AppResult<AssetDto> {
        let (asset, input) = self.video_input(id).await?;
        let output = self.engine.mute(&input).await?;
        self.finish_transform(output, &asset, asset.derived_name("muted", None))
            .await
    }

    pub async fn replace_asset_audio(
        &self,
        video_id: Uuid,
        audio_id: Uuid,
    ) -> AppResult<AssetDto> {
        let (asset, input) = self.video_input(video_id).await?;
        let audio_path = self.kind_input(audio_id, AssetKind::Audio).await?;
        let output = self.engine.replace_audio(&input, &audio_path).await?;
        self.finish_transform(output, &asset, asset.derived_name("audio", None))
            .await
    }

    /// Change playback speed. A factor within the identity epsilon of 1.0
    /// returns the source asset untouched; no file is produced.
    pub async fn change_asset_speed(&self, id: Uuid, factor: f64) -> AppResult<AssetDto> {
        if !factor.is_finite() || factor < SPEED_FACTOR_MIN || factor > SPEED_FACTOR_MAX {
            return Err(AppError::Validation(format!(
                "Speed factor must be between {} and {}",
                SPEED_FACTOR_MIN, SPEED_FACTOR_MAX
            )));
        }
        let (asset, input) = self.video_input(id).await?;
        if (factor - 1.0).abs() <= SPEED_IDENTITY_EPSILON {
            return Ok(self.enrich(asset).await);
        }

        let output = self.engine.change_speed(&input, factor).await?;
        let suffix = if factor > 1.0 {
            format!("fast-{}", factor)
        } else {
            format!("slow-{}", factor)
        };
        self.finish_transform(output, &asset, asset.derived_name(&suffix, None))
            .await
    }

    /// Concatenate two or more video assets in request order.
    pub async fn merge_asset_clips(
        &self,
        ids: &[Uuid],
        format: Option<ExportFormat>,
    ) -> AppResult<AssetDto> {
        if ids.len() < 2 {
            return Err(AppError::Validation(
                "Merge requires at least two clips".to_string(),
            ));
        }

        let mut first: Option<Asset> = None;
        let mut paths = Vec::with_capacity(ids.len());
        for id in ids {
            let (asset, path) = self.video_input(*id).await?;
            if first.is_none() {
                first = Some(asset);
            }
            paths.push(path);
        }
        let first = first.unwrap();

        let format = format.unwrap_or(ExportFormat::Mp4);
        let output = self.engine.merge(&paths, format).await?;
        let display_name = format!(
            "merged-{}.{}",
            chrono::Utc::now().timestamp_millis(),
            format
        );
        self.finish_transform(output, &first, display_name).await
    }

    /// Register an engine output as a new asset derived from `source`.
    pub(crate) async fn register_generated(
        &self,
        output: &Path,
        source: &Asset,
        display_name: String,
    ) -> AppResult<Asset> {
        let stored_name = output
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "Engine output path has no file name: {}",
                    output.display()
                ))
            })?
            .to_string();

        self.library
            .register(NewAsset {
                mime_type: guess_mime(&stored_name).to_string(),
                original_name: display_name,
                stored_name,
                derived_from: Some(source.id),
            })
            .await
    }

    async fn finish_transform(
        &self,
        output: PathBuf,
        source: &Asset,
        display_name: String,
    ) -> AppResult<AssetDto> {
        let asset = self.register_generated(&output, source, display_name).await?;
        Ok(self.enrich(asset).await)
    }

    pub(crate) async fn video_input(&self, id: Uuid) -> AppResult<(Asset, PathBuf)> {
        let asset = self.library.get(id).await?;
        ensure_kind(&asset, AssetKind::Video)?;
        let path = self.library.resolve_path(id).await?;
        Ok((asset, path))
    }

    pub(crate) async fn kind_input(&self, id: Uuid, expected: AssetKind) -> AppResult<PathBuf> {
        let asset = self.library.get(id).await?;
        ensure_kind(&asset, expected)?;
        self.library.resolve_path(id).await
    }

    /// Attach probe metadata to video DTOs. Probe failures are logged and
    /// otherwise ignored; metadata is an enrichment, not a contract.
    pub(crate) async fn enrich(&self, asset: Asset) -> AssetDto {
        let mut dto = asset.to_dto();
        if asset.kind != AssetKind::Video {
            return dto;
        }
        match self.library.resolve_path(asset.id).await {
            Ok(path) => match self.engine.probe(&path).await {
                Ok(probe) => dto.metadata = Some(probe),
                Err(e) => {
                    tracing::warn!(asset_id = %asset.id, error = %e, "Probe failed");
                }
            },
            Err(e) => {
                tracing::warn!(asset_id = %asset.id, error = %e, "Probe path unresolvable");
            }
        }
        dto
    }
}

fn ensure_kind(asset: &Asset, expected: AssetKind) -> AppResult<()> {
    if asset.kind != expected {
        return Err(AppError::InvalidKind {
            id: asset.id,
            expected: expected.expected_phrase(),
        });
    }
    Ok(())
}
