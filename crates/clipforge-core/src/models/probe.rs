//! Probe-derived technical metadata for video assets.
//!
//! Computed on demand by the engine adapter, attached to DTOs by
//! enrichment, never persisted. Source files are immutable once
//! registered, so there is nothing to invalidate.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoProbe {
    pub duration: Option<f64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub codec: Option<String>,
    pub frame_rate: Option<f64>,
}
