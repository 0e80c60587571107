pub mod asset;
pub mod operations;
pub mod probe;

pub use asset::{Asset, AssetDto, AssetKind, AssetPatch};
pub use operations::{
    ExportFormat, ExportOperations, FilterKind, FilterParams, ImageOverlayParams,
    ImageOverlayRef, ReplaceAudioRef, Resolution, SpeedParams, TextOverlayParams, TrimParams,
};
pub use probe::VideoProbe;
