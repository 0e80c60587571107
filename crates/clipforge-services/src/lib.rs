//! Service layer: single-step operations and the staged export pipeline.
//!
//! Services own the orchestration between the asset registry, the
//! artifact store, and the transformation engine. Handlers stay thin;
//! everything that decides *which* files exist afterwards lives here.

mod export;
mod media;

pub use export::ExportRequest;
pub use media::MediaService;

#[cfg(test)]
pub(crate) mod test_support;
