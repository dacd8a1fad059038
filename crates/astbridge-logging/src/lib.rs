//! astbridge-logging - Tracing setup for the bootstrap tools
//!
//! This crate provides:
//! - [`init_logging`] installing a formatted, filtered global subscriber
//! - [`RecordingLayer`] capturing events so tests can assert diagnostics

mod layer;

pub use astbridge_core::LogLevel;
pub use layer::{RecordedEvent, RecordingLayer};

use tracing_subscriber::EnvFilter;

/// Filter for `level`, unless `RUST_LOG` is set.
pub fn env_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_directive()))
}

/// Install the global subscriber writing to stderr.
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_logging(level: LogLevel) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{LogLevel, RecordedEvent, RecordingLayer, init_logging};
}
