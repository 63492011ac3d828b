//! Error types for fetch operations.

use std::io;

use reqwest::StatusCode;
use thiserror::Error;

/// Primary error type for fetch operations.
///
/// Every variant is recoverable from the pipeline's point of view: a failed
/// fetch skips one asset, never the whole run.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP client could not be constructed.
    #[error("failed to build http client")]
    Client {
        /// Source client error.
        source: reqwest::Error,
    },
    /// Local file could not be read.
    #[error("failed to read local asset")]
    File {
        /// Path of the unreadable file.
        path: String,
        /// Source IO error.
        source: io::Error,
    },
    /// HTTP transport failed before or while streaming the body.
    #[error("http request failed")]
    Http {
        /// URL the request targeted.
        url: String,
        /// Source transport error.
        source: reqwest::Error,
    },
    /// Server answered with a non-success status.
    #[error("http request rejected")]
    Status {
        /// URL the request targeted.
        url: String,
        /// Status code the server returned.
        status: StatusCode,
    },
}

/// Convenience alias for fetch results.
pub type FetchResult<T> = Result<T, FetchError>;
