#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Sequential asset-loading pipeline: scan, fetch, cache, decode, collect.
//!
//! Layout: `classify.rs` (extension tables and folder scanning), `decode.rs`
//! (image decoding with mipmap generation), `audio.rs` (WAV reader and
//! compressed passthrough), `cache.rs` (download cache), `service.rs` (the
//! queue worker), `error.rs` (per-asset failure taxonomy).

pub mod audio;
pub mod cache;
pub mod classify;
pub mod decode;
pub mod error;
pub mod service;

pub use audio::{AudioError, decode_audio, decode_wav};
pub use classify::{classify_path, extension_of, scan_folder};
pub use decode::decode_image;
pub use error::PipelineError;
pub use service::{AssetLoader, LoaderConfig, LoaderHandle, PROGRESS_EVENT_STEP};
