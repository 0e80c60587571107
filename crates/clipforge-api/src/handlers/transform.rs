//! Single-step transformation handlers. Each registers a new derived
//! asset and answers 201 `{asset}`.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use uuid::Uuid;

use clipforge_core::models::{
    AssetDto, FilterParams, ImageOverlayRef, ReplaceAudioRef, SpeedParams, TextOverlayParams,
    TrimParams,
};

use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;

fn created(asset: AssetDto) -> impl IntoResponse {
    (StatusCode::CREATED, Json(json!({ "asset": asset })))
}

/// `POST /api/media/assets/:id/trim`
pub async fn trim_asset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(params): ValidatedJson<TrimParams>,
) -> Result<impl IntoResponse, HttpAppError> {
    let asset = state.media.trim_asset(id, params).await?;
    Ok(created(asset))
}

/// `POST /api/media/assets/:id/filter`
pub async fn filter_asset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(params): ValidatedJson<FilterParams>,
) -> Result<impl IntoResponse, HttpAppError> {
    let asset = state.media.apply_asset_filter(id, params).await?;
    Ok(created(asset))
}

/// `POST /api/media/assets/:id/text-overlays`
pub async fn add_text_overlay(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(params): ValidatedJson<TextOverlayParams>,
) -> Result<impl IntoResponse, HttpAppError> {
    let asset = state.media.add_asset_text(id, params).await?;
    Ok(created(asset))
}

/// `POST /api/media/assets/:id/image-overlays`
pub async fn add_image_overlay(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(body): ValidatedJson<ImageOverlayRef>,
) -> Result<impl IntoResponse, HttpAppError> {
    let asset = state
        .media
        .add_asset_image(id, body.image_asset_id, body.options)
        .await?;
    Ok(created(asset))
}

/// `POST /api/media/assets/:id/audio/mute`
pub async fn mute_audio(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let asset = state.media.mute_asset_audio(id).await?;
    Ok(created(asset))
}

/// `POST /api/media/assets/:id/audio/replace`
pub async fn replace_audio(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(body): ValidatedJson<ReplaceAudioRef>,
) -> Result<impl IntoResponse, HttpAppError> {
    let asset = state
        .media
        .replace_asset_audio(id, body.audio_asset_id)
        .await?;
    Ok(created(asset))
}

/// `POST /api/media/assets/:id/speed`
pub async fn change_speed(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(params): ValidatedJson<SpeedParams>,
) -> Result<impl IntoResponse, HttpAppError> {
    let asset = state.media.change_asset_speed(id, params.factor).await?;
    Ok(created(asset))
}
