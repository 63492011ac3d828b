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

//! Transport layer for asset payloads.
//!
//! Layout: `fetcher.rs` (the [`AssetFetcher`] seam plus source/payload
//! types), `http.rs` (the production `reqwest`-backed implementation),
//! `error.rs` (fetch error taxonomy).

pub mod error;
pub mod fetcher;
pub mod http;

pub use error::{FetchError, FetchResult};
pub use fetcher::{AssetFetcher, FetchSource, FetchedPayload, ProgressObserver};
pub use http::HttpFetcher;
