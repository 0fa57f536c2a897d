// src/config/mod.rs
//! Configuration management for the coin switcher
//!
//! This module handles:
//! - Loading and validating TOML configuration files
//! - Built-in defaults used when no file is given
//! - Generating a commented configuration template

/// Core configuration implementation
pub mod config;

// Re-export key items for easy access
pub use config::{CoinConfig, Config, FeedConfig, JournalConfig, MinerConfig, ScheduleConfig};

use crate::utils::error::SwitchError;
use std::path::Path;

/// Loads configuration from a TOML file, or the built-in defaults when `path` is `None`
///
/// # Returns
/// * `Ok(Config)` - Loaded and validated configuration
/// * `Err(SwitchError::ConfigError)` - If the file couldn't be read, parsed or validated
pub fn load(path: Option<&Path>) -> Result<Config, SwitchError> {
    match path {
        Some(path) => Config::load(path),
        None => {
            log::info!("No configuration file given, using built-in coin catalog");
            let config = Config::default();
            config.validate()?;
            Ok(config)
        }
    }
}

/// Generates a commented configuration template
pub fn generate_template() -> String {
    Config::generate_template()
}
