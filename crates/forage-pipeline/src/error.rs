//! Per-item error taxonomy for pipeline runs.
//!
//! None of these abort a run: a failing asset is logged, surfaced as an
//! `asset_failed` event, and skipped.

use forage_fetch::FetchError;
use thiserror::Error;

use crate::audio::AudioError;

/// Recoverable per-asset failure raised while loading one candidate.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Transport reported a failure for this asset.
    #[error("fetch failed")]
    Fetch {
        /// URL or path the fetch targeted.
        url: String,
        /// Source fetch error.
        source: FetchError,
    },
    /// The spawned fetch task was aborted or panicked.
    #[error("fetch task interrupted")]
    FetchTask {
        /// URL or path the fetch targeted.
        url: String,
        /// Source join error.
        source: tokio::task::JoinError,
    },
    /// Remote payload could not be persisted to the download cache.
    #[error("cache write failed")]
    Cache {
        /// Cache path the write targeted.
        path: String,
        /// Source IO error.
        source: std::io::Error,
    },
    /// No cache file name could be derived from the source path.
    #[error("cache name not derivable")]
    CacheName {
        /// Source path missing a usable base name.
        path: String,
    },
    /// Image payload could not be decoded.
    #[error("image decode failed")]
    DecodeImage {
        /// Key of the failing asset.
        key: String,
        /// Source decoder error.
        source: image::ImageError,
    },
    /// Audio payload could not be decoded.
    #[error("audio decode failed")]
    DecodeAudio {
        /// Key of the failing asset.
        key: String,
        /// Source decoder error.
        source: AudioError,
    },
}
