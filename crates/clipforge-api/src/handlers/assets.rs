//! Asset CRUD and download handlers.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use tokio_util::io::ReaderStream;
use uuid::Uuid;

use clipforge_core::models::AssetPatch;
use clipforge_core::AppError;

use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;

/// `GET /api/media/assets`
pub async fn list_assets(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let assets = state.media.list_assets().await;
    Ok(Json(json!({ "assets": assets })))
}

/// `GET /api/media/assets/:id`
pub async fn get_asset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let asset = state.media.get_asset_details(id).await?;
    Ok(Json(json!({ "asset": asset })))
}

/// `PATCH /api/media/assets/:id`
pub async fn patch_asset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(patch): ValidatedJson<AssetPatch>,
) -> Result<impl IntoResponse, HttpAppError> {
    let asset = state.media.patch_asset(id, patch).await?;
    Ok(Json(json!({ "asset": asset })))
}

/// `DELETE /api/media/assets/:id`
pub async fn delete_asset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.media.remove_asset(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/media/assets/:id/download` - stream the backing file as an
/// attachment under the asset's display name.
pub async fn download_asset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let (asset, path) = state.media.resolve_download(id).await?;

    let file = tokio::fs::File::open(&path).await.map_err(|e| {
        AppError::Storage(format!(
            "Failed to open {} for download: {}",
            path.display(),
            e
        ))
    })?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&asset.mime_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    // Display name may contain characters invalid in a header; fall back
    // to the stored name, which is always safe.
    let disposition = format!("attachment; filename=\"{}\"", asset.original_name);
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition).unwrap_or_else(|_| {
            HeaderValue::from_str(&format!("attachment; filename=\"{}\"", asset.stored_name))
                .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
        }),
    );

    let body = Body::from_stream(ReaderStream::new(file));
    Ok((headers, body))
}
