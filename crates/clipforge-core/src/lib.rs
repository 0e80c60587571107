//! Clipforge Core Library
//!
//! This crate provides the domain models, error taxonomy, configuration,
//! and media-type constants shared across all Clipforge components.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, AppResult, ErrorMetadata, LogLevel};
pub use models::asset::{Asset, AssetDto, AssetKind, AssetPatch};
pub use models::operations::{
    ExportFormat, ExportOperations, FilterKind, FilterParams, ImageOverlayParams, Resolution,
    SpeedParams, TextOverlayParams, TrimParams,
};
