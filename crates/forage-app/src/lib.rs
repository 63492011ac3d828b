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

//! Forage application bootstrap wiring.
//!
//! Layout: `bootstrap.rs` (settings, logging, and loader wiring),
//! `reporter.rs` (event stream rendering).

/// Application bootstrap and environment loading.
pub mod bootstrap;
/// Application error taxonomy.
pub mod error;
/// Event stream rendering for the console.
pub mod reporter;

pub use bootstrap::run_app;
pub use error::{AppError, AppResult};
