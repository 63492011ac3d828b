//! Logging bootstrap shared across the Forage workspace.
//!
//! Layout: `init.rs` (subscriber installation and format selection),
//! `error.rs` (telemetry failure types).

/// Telemetry failure types.
pub mod error;
/// Subscriber installation and logging configuration.
pub mod init;

pub use error::{Result, TelemetryError};
pub use init::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, init_logging};
