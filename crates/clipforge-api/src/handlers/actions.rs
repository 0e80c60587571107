//! Merge and export actions.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use clipforge_core::models::{ExportFormat, ExportOperations, Resolution};
use clipforge_core::AppError;
use clipforge_services::ExportRequest;

use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MergeRequest {
    #[validate(length(min = 2, message = "Merge requires at least two clips"))]
    pub clip_ids: Vec<Uuid>,
    #[serde(default)]
    pub format: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBody {
    pub asset_id: Uuid,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub resolution: Option<Resolution>,
    #[serde(default)]
    pub operations: ExportOperations,
}

fn parse_format(format: Option<&str>) -> Result<Option<ExportFormat>, AppError> {
    match format {
        None => Ok(None),
        Some(raw) => ExportFormat::parse(raw)
            .map(Some)
            .ok_or_else(|| AppError::UnsupportedFormat(raw.to_string())),
    }
}

/// `POST /api/media/actions/merge`
pub async fn merge_clips(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<MergeRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let format = parse_format(body.format.as_deref())?;

    let asset = state.media.merge_asset_clips(&body.clip_ids, format).await?;
    Ok((StatusCode::CREATED, Json(json!({ "asset": asset }))))
}

/// `POST /api/media/actions/export`
pub async fn export_asset(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<ExportBody>,
) -> Result<impl IntoResponse, HttpAppError> {
    let format = parse_format(body.format.as_deref())?;

    let request = ExportRequest {
        format,
        resolution: body.resolution.unwrap_or_default(),
        operations: body.operations,
    };
    let asset = state.media.export_asset(body.asset_id, request).await?;
    Ok((StatusCode::CREATED, Json(json!({ "asset": asset }))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_request_requires_two_clips() {
        let body: MergeRequest =
            serde_json::from_str(&format!(r#"{{"clipIds":["{}"]}}"#, Uuid::new_v4())).unwrap();
        assert!(body.validate().is_err());
    }

    #[test]
    fn test_parse_format() {
        assert_eq!(parse_format(None).unwrap(), None);
        assert_eq!(parse_format(Some("webm")).unwrap(), Some(ExportFormat::Webm));
        assert!(matches!(
            parse_format(Some("avi")),
            Err(AppError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_export_body_defaults() {
        let body: ExportBody =
            serde_json::from_str(&format!(r#"{{"assetId":"{}"}}"#, Uuid::new_v4())).unwrap();
        assert!(body.format.is_none());
        assert!(body.resolution.is_none());
        assert!(body.operations.is_empty());
    }
}
