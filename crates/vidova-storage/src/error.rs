//! Storage error types.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during media store operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to initialize media store: {0}")]
    InitError(String),

    #[error("Media not found: {0}")]
    NotFound(String),

    #[error("Invalid media key: {0}")]
    InvalidKey(String),

    #[error("Invalid byte range {start}-{end} for size {size}")]
    InvalidRange { start: u64, end: u64, size: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub fn init_error(msg: impl Into<String>) -> Self {
        Self::InitError(msg.into())
    }

    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound(key.into())
    }

    pub fn invalid_key(key: impl Into<String>) -> Self {
        Self::InvalidKey(key.into())
    }
}
