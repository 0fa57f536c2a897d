// src/utils/mod.rs
//! Utilities module for common functionality
//!
//! Shared error handling and logging infrastructure.

/// Error types and handling utilities
///
/// Contains the [`SwitchError`] enum covering configuration, feed,
/// and miner process failures.
pub mod error;

/// Logging configuration and utilities
pub mod logging;

// Re-export for easier access
pub use error::SwitchError;
pub use logging::{init_logging, init_verbose_logging};
