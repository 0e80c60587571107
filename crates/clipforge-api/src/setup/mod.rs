//! Application wiring: store, registry, engine, service, router.

pub mod routes;
pub mod server;

use std::sync::Arc;

use anyhow::Result;
use axum::Router;

use clipforge_core::Config;
use clipforge_engine::FfmpegEngine;
use clipforge_library::AssetLibrary;
use clipforge_services::MediaService;
use clipforge_storage::MediaStore;

use crate::state::AppState;

pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, Router)> {
    let store = MediaStore::new(config.upload_dir())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialise artifact store: {}", e))?;

    let library = AssetLibrary::load(config.library_file(), store.clone()).await?;

    let engine = FfmpegEngine::new(&config.ffmpeg_path, &config.ffprobe_path, store)?;

    let media = MediaService::new(Arc::new(library), Arc::new(engine));

    let state = Arc::new(AppState {
        config,
        media,
    });

    let router = routes::build_router(state.clone());
    Ok((state, router))
}
