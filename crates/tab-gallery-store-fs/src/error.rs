//! Error types for key-value store operations.

use thiserror::Error;

/// Errors that can occur while reading or writing persisted items.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Key contains characters that cannot be mapped to a file name.
    #[error("Invalid key: {0:?}")]
    InvalidKey(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Background blocking task panicked or was cancelled.
    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// Other unclassified error.
    #[error("Other error: {0}")]
    Other(String),
}
