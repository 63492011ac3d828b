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

//! JSON-file-backed application settings.
//!
//! Layout: `store.rs` (raw key/value store + applier registry), `model.rs`
//! (typed settings views), `paths.rs` (path-alias token resolution).

pub mod error;
pub mod model;
pub mod paths;
pub mod store;

pub use error::{ConfigError, ConfigResult};
pub use model::{AppSettings, LOADER_KEY, LOGGING_KEY, LoaderSettings, LoggingSettings};
pub use paths::{ASSETS_TOKEN, DATA_TOKEN, PathResolver};
pub use store::SettingsStore;
