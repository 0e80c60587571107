//! Route table and middleware stack.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = if state.config.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let upload_dir = state.config.upload_dir();
    let max_upload_size = state.config.max_upload_size_bytes;

    let api = Router::new()
        .route(
            "/assets",
            post(handlers::upload::upload_asset).get(handlers::assets::list_assets),
        )
        .route("/assets/batch", post(handlers::upload::upload_batch))
        .route(
            "/assets/{id}",
            get(handlers::assets::get_asset)
                .patch(handlers::assets::patch_asset)
                .delete(handlers::assets::delete_asset),
        )
        .route("/assets/{id}/download", get(handlers::assets::download_asset))
        .route("/assets/{id}/trim", post(handlers::transform::trim_asset))
        .route("/assets/{id}/filter", post(handlers::transform::filter_asset))
        .route(
            "/assets/{id}/text-overlays",
            post(handlers::transform::add_text_overlay),
        )
        .route(
            "/assets/{id}/image-overlays",
            post(handlers::transform::add_image_overlay),
        )
        .route("/assets/{id}/audio/mute", post(handlers::transform::mute_audio))
        .route(
            "/assets/{id}/audio/replace",
            post(handlers::transform::replace_audio),
        )
        .route("/assets/{id}/speed", post(handlers::transform::change_speed))
        .route("/actions/merge", post(handlers::actions::merge_clips))
        .route("/actions/export", post(handlers::actions::export_asset));

    Router::new()
        .nest("/api/media", api)
        .nest_service("/media/files", ServeDir::new(upload_dir))
        .route("/health", get(handlers::health::health_check))
        .layer(DefaultBodyLimit::max(max_upload_size))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
