// src/utils/error.rs
use std::io;
use thiserror::Error;

/// Main error type for the coin switcher
///
/// Only [`SwitchError::ConfigError`] is fatal. Everything that originates
/// outside the process (the ranking feed, the miner binary) is recoverable:
/// the scheduler logs it and retries on its next cadence.
#[derive(Error, Debug)]
pub enum SwitchError {
    /// Configuration file, catalog, or parameter errors (fatal at startup)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Ranking feed unreachable, timed out, or answered with a non-success status
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Ranking feed answered with a structurally invalid document
    #[error("Feed parse error: {0}")]
    ParseError(String),

    /// The miner executable could not be launched
    #[error("Miner spawn error: {0}")]
    SpawnError(String),

    /// Supervisor misuse, e.g. starting a miner while one is still running
    #[error("Supervisor error: {0}")]
    SupervisorError(String),

    /// Standard I/O operation errors
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    /// HTTP client errors outside of a feed request (e.g. client construction)
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl SwitchError {
    /// Whether the error came from the ranking feed
    ///
    /// Callers treat a failed fetch exactly like "no better coin this cycle".
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            SwitchError::NetworkError(_) | SwitchError::ParseError(_) | SwitchError::HttpError(_)
        )
    }
}

/// Converts TOML decoding errors into a fatal configuration error
impl From<toml::de::Error> for SwitchError {
    fn from(e: toml::de::Error) -> Self {
        SwitchError::ConfigError(format!("Invalid config format: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_failures_are_classified() {
        assert!(SwitchError::NetworkError("timeout".into()).is_fetch_failure());
        assert!(SwitchError::ParseError("not json".into()).is_fetch_failure());
        assert!(!SwitchError::ConfigError("no coins".into()).is_fetch_failure());
        assert!(!SwitchError::SpawnError("ENOENT".into()).is_fetch_failure());
    }

    #[test]
    fn toml_errors_become_config_errors() {
        let err: SwitchError = toml::from_str::<toml::Value>("= broken").unwrap_err().into();
        assert!(matches!(err, SwitchError::ConfigError(_)));
        assert!(err.to_string().starts_with("Configuration error"));
    }
}
