//! Telemetry error types.

use thiserror::Error;

/// Errors that can occur while setting up telemetry.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Invalid logging configuration.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// The global subscriber could not be installed.
    #[error("initialization error: {0}")]
    InitError(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
