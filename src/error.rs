//! Unified error types for listenwatch
//!
//! This module defines all error types used throughout the application.
//! Uses thiserror for ergonomic error definitions.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from the session log backing store
    #[error("Session log error: {0}")]
    Store(#[from] StoreError),

    /// Error from configuration parsing/validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error fetching or parsing the status page
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Error rendering a plot
    #[error("Plot error: {0}")]
    Plot(#[from] PlotError),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from fetching and parsing the status page
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    /// Request failed (DNS, connect, timeout, body read)
    #[error("Request failed: {0}")]
    Request(String),

    /// Server answered with a non-success status
    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    /// Markers were present but did not hold listener counts
    #[error("Malformed markers: {0}")]
    Markers(String),
}

/// Errors from the session log backing store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem error
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV encoding/decoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A row could not be decoded into an observation
    #[error("Invalid row {line}: {message}")]
    InvalidRow { line: u64, message: String },

    /// The log holds no rows
    #[error("Session log is empty: {0}")]
    EmptyLog(PathBuf),

    /// The log file does not exist
    #[error("Session log not found: {0}")]
    NotFound(PathBuf),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors from the mail transport
///
/// These never escape the notifier; they are folded into a `NotifyStatus`.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Credentials source missing or malformed
    #[error("Invalid credentials: {0}")]
    Credentials(String),

    /// Sender or recipient address did not parse
    #[error("Invalid address '{0}'")]
    Address(String),

    /// Message could not be built
    #[error("Failed to build message: {0}")]
    Message(String),

    /// SMTP relay rejected or was unreachable
    #[error("SMTP error: {0}")]
    Smtp(String),
}

/// Errors from configuration parsing and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Failed to parse config file
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid config value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Errors from plot rendering
#[derive(Error, Debug)]
pub enum PlotError {
    /// Nothing to draw
    #[error("No listener counts to plot")]
    NoData,

    /// Image encoding or file write failed
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_log_display() {
        let err = StoreError::EmptyLog(PathBuf::from("/tmp/a.csv"));
        assert_eq!(err.to_string(), "Session log is empty: /tmp/a.csv");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::invalid("tick_interval_seconds", "must be 1-60");
        assert!(err.to_string().contains("tick_interval_seconds"));
        assert!(err.to_string().contains("must be 1-60"));
    }

    #[test]
    fn test_fetch_status_display() {
        let err = FetchError::Status(503);
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_error_conversion() {
        let store_err = StoreError::NotFound(PathBuf::from("x.csv"));
        let app_err: AppError = store_err.into();
        assert!(matches!(app_err, AppError::Store(_)));
    }
}
