//! Core error types

use thiserror::Error;

/// Core error type for LatticeSync
#[derive(Debug, Error)]
pub enum CoreError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
