//! Error types for settings operations.

use std::io;

use thiserror::Error;

/// Primary error type for settings operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Settings document could not be parsed as JSON.
    #[error("failed to parse settings document")]
    Parse {
        /// Path of the offending document.
        path: String,
        /// Source parser error.
        source: serde_json::Error,
    },
    /// Settings document parsed to something other than a JSON object.
    #[error("settings document is not a JSON object")]
    UnexpectedDocument {
        /// Path of the offending document.
        path: String,
    },
    /// Settings could not be serialized for persistence.
    #[error("failed to serialize settings document")]
    Serialize {
        /// Source serializer error.
        source: serde_json::Error,
    },
    /// Underlying filesystem operation failed.
    #[error("filesystem operation failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Path the operation touched.
        path: String,
        /// Source IO error.
        source: io::Error,
    },
}

/// Convenience alias for settings results.
pub type ConfigResult<T> = Result<T, ConfigError>;
