// src/utils/logging.rs
//! Logging configuration and utilities
//!
//! Handles logger setup for the switcher:
//! - Standard logging configuration
//! - Verbose (debug) logging for troubleshooting feed and miner issues
//!
//! Uses `env_logger` under the hood with custom formatting and filtering.

use env_logger::{Builder, Target};
use log::LevelFilter;
use std::env;

/// Initializes the logging subsystem with sensible defaults
///
/// # Configuration
/// - Logs to stdout, next to the mirrored switch journal
/// - Default log level: Info
/// - Respects `RUST_LOG` environment variable if set
pub fn init_logging() {
    init_with_default(LevelFilter::Info);
}

/// Configures verbose logging
///
/// Same as [`init_logging`] but defaults to Debug, which shows every
/// cadence tick, each fetched coin and deferred switches.
pub fn init_verbose_logging() {
    init_with_default(LevelFilter::Debug);
}

fn init_with_default(level: LevelFilter) {
    let mut builder = common_log_config();

    if env::var("RUST_LOG").is_err() {
        builder.filter_level(level);
    } else {
        builder.parse_env("RUST_LOG");
    }

    // A second init (e.g. from tests) is harmless
    let _ = builder.try_init();
}

/// Creates a base logger builder with common settings
///
/// Format: `[timestamp level module:line] message`, written to stdout.
fn common_log_config() -> Builder {
    let mut builder = Builder::new();

    builder
        .format(|buf, record| {
            use std::io::Write;
            let ts = buf.timestamp_seconds();
            let level = record.level();
            let module = record.module_path().unwrap_or_default();
            let line = record.line().unwrap_or(0);

            writeln!(
                buf,
                "[{} {} {}:{}] {}",
                ts,
                level,
                module,
                line,
                record.args()
            )
        })
        .target(Target::Stdout);

    builder
}
