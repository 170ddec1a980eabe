//! Logging infrastructure for batch reprojection.
//!
//! This module provides:
//! - A per-run logger with console callback + optional file output
//! - Integration with the `tracing` ecosystem for diagnostics
//!
//! # Example
//!
//! ```no_run
//! use reproj_core::logging::{RunLoggerBuilder, LogLevel};
//!
//! let logger = RunLoggerBuilder::new("reproj_run")
//!     .log_dir("/path/to/logs")
//!     .level(LogLevel::Info)
//!     .callback(Box::new(|line| println!("{}", line)))
//!     .build()
//!     .unwrap();
//!
//! logger.phase("Batch reprojection");
//! logger.info("Converted elevA.tif to proj_elevA.ti");
//! ```

mod run_logger;
mod types;

pub use run_logger::{RunLogger, RunLoggerBuilder};
pub use types::{LogCallback, LogConfig, LogLevel, MessagePrefix};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize global tracing subscriber for application-wide logging.
///
/// This sets up a subscriber that:
/// - Respects RUST_LOG environment variable
/// - Falls back to the provided default level
/// - Outputs to stderr, keeping stdout for run lines
///
/// Should be called once at application startup.
pub fn init_tracing(default_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_filter_str()));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false),
        )
        .with(filter)
        .init();
}

/// Initialize tracing for tests (only logs warnings and above).
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}
