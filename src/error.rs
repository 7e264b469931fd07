use thiserror::Error;

/// Main error type for the sinklog engine
///
/// Only setup paths (configuration, sink initialization, flushing) report
/// errors. The write path never fails; sinks report outcomes through
/// [`SinkWrite`](crate::sinks::SinkWrite) instead.
#[derive(Debug, Error)]
pub enum SinklogError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid configuration file: {0}")]
    InvalidConfig(String),

    #[error("Configuration validation failed: {0}")]
    ConfigValidationError(String),

    #[error("Unknown sink class: {0}")]
    UnknownSinkClass(String),

    // Sink errors
    #[error("Failed to initialize sink {0}: {1}")]
    SinkInitError(String, String),

    #[error("Failed to open log file: {0}")]
    LogFileError(String),

    #[error("Log rotation failed: {0}")]
    LogRotationError(String),

    // IO errors (automatically converted from std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for sinklog operations
pub type Result<T> = std::result::Result<T, SinklogError>;
