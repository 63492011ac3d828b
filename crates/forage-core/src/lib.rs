//! Engine-agnostic asset-loading interfaces and DTOs.

/// Display-control collaborator interface for multi-monitor hosts.
pub mod display;
/// Core asset domain types shared across the workspace.
pub mod model;

pub use display::{DisplayControl, NoopDisplayControl, WindowStyle};
pub use model::{
    AssetCollection, AssetDescriptor, AssetKind, AudioBuffer, AudioFormat, CompletionHandler,
    ImageBuffer, LoadRequest, LoadSource, LoadStatus, MipLevel, RunReport,
};
