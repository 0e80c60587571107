//! Multipart upload handlers.

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use clipforge_core::constants::{
    guess_mime, AUDIO_EXTENSIONS, AUDIO_MIME_TYPES, IMAGE_EXTENSIONS, IMAGE_MIME_TYPES,
    VIDEO_EXTENSIONS, VIDEO_MIME_TYPES,
};
use clipforge_core::models::AssetDto;
use clipforge_core::{AppError, AppResult};

use crate::error::HttpAppError;
use crate::state::AppState;

const MAX_BATCH_FILES: usize = 10;

/// Accept a file when either its declared MIME type or its extension is
/// a known media type. `application/octet-stream` (and unknown types)
/// are normalized through the extension map.
fn resolve_mime(file_name: &str, content_type: Option<&str>) -> AppResult<String> {
    if let Some(ct) = content_type {
        if ct != "application/octet-stream"
            && (VIDEO_MIME_TYPES.contains(&ct)
                || AUDIO_MIME_TYPES.contains(&ct)
                || IMAGE_MIME_TYPES.contains(&ct))
        {
            return Ok(ct.to_string());
        }
    }

    let ext = file_name
        .rfind('.')
        .map(|i| file_name[i..].to_ascii_lowercase())
        .unwrap_or_default();
    if VIDEO_EXTENSIONS.contains(&ext.as_str())
        || AUDIO_EXTENSIONS.contains(&ext.as_str())
        || IMAGE_EXTENSIONS.contains(&ext.as_str())
    {
        return Ok(guess_mime(file_name).to_string());
    }

    Err(AppError::Validation(format!(
        "Unsupported media type for '{}'",
        file_name
    )))
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Malformed multipart body: {}", e))
}

async fn read_field(
    field: axum::extract::multipart::Field<'_>,
) -> AppResult<(String, String, axum::body::Bytes)> {
    let file_name = field.file_name().unwrap_or("upload").to_string();
    let content_type = field.content_type().map(|s| s.to_string());
    let mime = resolve_mime(&file_name, content_type.as_deref())?;
    let data = field.bytes().await.map_err(multipart_error)?;
    if data.is_empty() {
        return Err(AppError::Validation(format!("File '{}' is empty", file_name)));
    }
    Ok((file_name, mime, data))
}

/// `POST /api/media/assets` - single file under field `file`.
pub async fn upload_asset(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let (file_name, mime, data) = read_field(field).await?;
        let asset = state.media.upload(&file_name, &mime, &data).await?;
        return Ok((StatusCode::CREATED, Json(json!({ "asset": asset }))));
    }
    Err(AppError::Validation("Missing multipart field 'file'".to_string()).into())
}

/// `POST /api/media/assets/batch` - up to 10 files under field `files`.
pub async fn upload_batch(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let mut assets: Vec<AssetDto> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("files") {
            continue;
        }
        if assets.len() >= MAX_BATCH_FILES {
            return Err(AppError::Validation(format!(
                "At most {} files per batch",
                MAX_BATCH_FILES
            ))
            .into());
        }
        let (file_name, mime, data) = read_field(field).await?;
        assets.push(state.media.upload(&file_name, &mime, &data).await?);
    }

    if assets.is_empty() {
        return Err(AppError::Validation("Missing multipart field 'files'".to_string()).into());
    }
    Ok((StatusCode::CREATED, Json(json!({ "assets": assets }))))
}
