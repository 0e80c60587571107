//! Shared fixtures: an engine stub that copies bytes instead of
//! shelling out, so pipeline behaviour is testable without ffmpeg.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use clipforge_core::models::{
    AssetDto, ExportFormat, FilterParams, ImageOverlayParams, Resolution, TextOverlayParams,
    TrimParams, VideoProbe,
};
use clipforge_engine::{EngineError, EngineResult, TransformEngine};
use clipforge_library::AssetLibrary;
use clipforge_storage::MediaStore;

use crate::MediaService;

pub(crate) struct StubEngine {
    store: MediaStore,
    fail_on: Option<&'static str>,
    pub calls: Mutex<Vec<&'static str>>,
}

impl StubEngine {
    fn new(store: MediaStore, fail_on: Option<&'static str>) -> Self {
        StubEngine {
            store,
            fail_on,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    async fn emit(
        &self,
        operation: &'static str,
        input: &Path,
        extension: Option<&str>,
    ) -> EngineResult<PathBuf> {
        self.calls.lock().unwrap().push(operation);
        if self.fail_on == Some(operation) || self.fail_on == Some("*") {
            return Err(EngineError::Failed {
                operation,
                detail: "stub failure".to_string(),
            });
        }
        let ext = match extension {
            Some(ext) => ext.to_string(),
            None => input
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("mp4")
                .to_string(),
        };
        let output = self.store.generate_output_path(&ext);
        tokio::fs::copy(input, &output).await?;
        Ok(output)
    }
}

#[async_trait]
impl TransformEngine for StubEngine {
    async fn trim(&self, input: &Path, _params: &TrimParams) -> EngineResult<PathBuf> {
        self.emit("trim", input, None).await
    }

    async fn color_filter(&self, input: &Path, _params: &FilterParams) -> EngineResult<PathBuf> {
        self.emit("filter", input, None).await
    }

    async fn text_overlay(
        &self,
        input: &Path,
        _params: &TextOverlayParams,
    ) -> EngineResult<PathBuf> {
        self.emit("text", input, None).await
    }

    async fn image_overlay(
        &self,
        video: &Path,
        _image: &Path,
        _params: &ImageOverlayParams,
    ) -> EngineResult<PathBuf> {
        self.emit("image_overlay", video, None).await
    }

    async fn mute(&self, input: &Path) -> EngineResult<PathBuf> {
        self.emit("mute", input, None).await
    }

    async fn replace_audio(&self, video: &Path, _audio: &Path) -> EngineResult<PathBuf> {
        self.emit("replace_audio", video, None).await
    }

    async fn merge(&self, clips: &[PathBuf], format: ExportFormat) -> EngineResult<PathBuf> {
        self.emit("merge", &clips[0], Some(format.as_str())).await
    }

    async fn transcode(
        &self,
        input: &Path,
        format: ExportFormat,
        _resolution: Resolution,
    ) -> EngineResult<PathBuf> {
        self.emit("transcode", input, Some(format.as_str())).await
    }

    async fn change_speed(&self, input: &Path, _factor: f64) -> EngineResult<PathBuf> {
        self.emit("speed", input, None).await
    }

    async fn probe(&self, _input: &Path) -> EngineResult<VideoProbe> {
        if self.fail_on == Some("probe") {
            return Err(EngineError::Failed {
                operation: "probe",
                detail: "stub failure".to_string(),
            });
        }
        Ok(VideoProbe {
            duration: Some(12.5),
            width: Some(1920),
            height: Some(1080),
            codec: Some("h264".to_string()),
            frame_rate: Some(30.0),
        })
    }
}

async fn build(fail_on: Option<&'static str>) -> (TempDir, MediaService, Arc<StubEngine>) {
    let dir = tempfile::tempdir().unwrap();
    let store = MediaStore::new(dir.path().join("uploads")).await.unwrap();
    let library = AssetLibrary::load(dir.path().join("library.json"), store.clone())
        .await
        .unwrap();
    let engine = Arc::new(StubEngine::new(store, fail_on));
    let service = MediaService::new(Arc::new(library), engine.clone());
    (dir, service, engine)
}

pub(crate) async fn service_with_stub() -> (TempDir, MediaService) {
    let (dir, service, _) = build(None).await;
    (dir, service)
}

pub(crate) async fn service_with_parts() -> (TempDir, MediaService, Arc<StubEngine>) {
    build(None).await
}

pub(crate) async fn failing_engine() -> (TempDir, MediaService) {
    let (dir, service, _) = build(Some("*")).await;
    (dir, service)
}

pub(crate) async fn failing_on(operation: &'static str) -> (TempDir, MediaService) {
    let (dir, service, _) = build(Some(operation)).await;
    (dir, service)
}

pub(crate) async fn upload_video(service: &MediaService, name: &str) -> AssetDto {
    service.upload(name, "video/mp4", b"fake video").await.unwrap()
}

pub(crate) async fn upload_image(service: &MediaService, name: &str) -> AssetDto {
    service.upload(name, "image/png", b"fake image").await.unwrap()
}

pub(crate) async fn upload_audio(service: &MediaService, name: &str) -> AssetDto {
    service.upload(name, "audio/mpeg", b"fake audio").await.unwrap()
}

/// Number of files currently in the upload directory.
pub(crate) async fn upload_file_count(root: &Path) -> usize {
    let mut entries = tokio::fs::read_dir(root.join("uploads")).await.unwrap();
    let mut count = 0;
    while entries.next_entry().await.unwrap().is_some() {
        count += 1;
    }
    count
}
