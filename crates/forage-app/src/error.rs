//! # Design
//!
//! - Centralize application-level errors for bootstrap and event reporting.
//! - Keep error messages constant while carrying context fields for debugging.
//! - Preserve source errors without re-logging at call sites.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Settings operations failed.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: forage_config::ConfigError,
    },
    /// Telemetry operations failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: forage_telemetry::TelemetryError,
    },
    /// Fetch client construction failed.
    #[error("fetch client operation failed")]
    Fetch {
        /// Operation identifier.
        operation: &'static str,
        /// Source fetch error.
        source: forage_fetch::FetchError,
    },
    /// IO operations failed.
    #[error("io operation failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Optional path involved in the failure.
        path: Option<PathBuf>,
        /// Source IO error.
        source: io::Error,
    },
}

impl AppError {
    pub(crate) const fn config(
        operation: &'static str,
        source: forage_config::ConfigError,
    ) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn telemetry(
        operation: &'static str,
        source: forage_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }

    pub(crate) const fn fetch(operation: &'static str, source: forage_fetch::FetchError) -> Self {
        Self::Fetch { operation, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn app_error_helpers_build_variants() {
        let config = AppError::config(
            "settings.load",
            forage_config::ConfigError::UnexpectedDocument {
                path: "forage.json".to_string(),
            },
        );
        assert!(matches!(config, AppError::Config { .. }));

        let fetch = AppError::fetch(
            "fetcher.new",
            forage_fetch::FetchError::File {
                path: "assets/hero.png".to_string(),
                source: io::Error::other("io"),
            },
        );
        assert!(matches!(fetch, AppError::Fetch { .. }));

        let io_error = AppError::Io {
            operation: "env.current_dir",
            path: None,
            source: io::Error::other("denied"),
        };
        assert!(matches!(io_error, AppError::Io { .. }));
    }

    #[test]
    fn messages_stay_constant() {
        let error = AppError::Io {
            operation: "env.current_dir",
            path: Some(PathBuf::from("/srv/forage")),
            source: io::Error::other("denied"),
        };
        assert_eq!(error.to_string(), "io operation failed");
    }
}
