//! Common error types for the Širava tools

use thiserror::Error;

/// Common result type for Širava operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the converter core and its shells
#[derive(Error, Debug)]
pub enum Error {
    /// Rundown input could not be decoded (wraps serde_json::Error)
    #[error("Rundown parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Program guide XML could not be written
    #[error("XML serialize error: {0}")]
    Serialize(String),

    /// Persisted program guide XML could not be read back
    #[error("Malformed schedule document: {0}")]
    MalformedSchedule(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
