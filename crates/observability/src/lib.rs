//! Tracing and logging setup shared by the binaries.

/// Subscriber configuration and installation.
pub mod tracing;

pub use crate::tracing::{LogConfig, LogFormat};

/// Initialize process-wide logging.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init(config: &LogConfig) {
    tracing::init(config);
}
