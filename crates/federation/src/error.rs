//! Error types for LatticeSync federation operations.

use thiserror::Error;

/// Errors that can occur in federation protocol operations.
#[derive(Debug, Error)]
pub enum FederationError {
    /// Client input incomplete: a required request field is absent or empty
    #[error("Missing required field: {field}")]
    MissingFields {
        /// Name of the absent field
        field: &'static str,
    },

    /// Manifest signature verification failed.
    ///
    /// Deliberately carries no detail about why verification failed.
    #[error("Invalid manifest signature")]
    InvalidSignature,

    /// A lattice node id that cannot name a stored object
    #[error("Invalid lattice node id: {id}")]
    InvalidNodeId {
        /// The offending id
        id: String,
    },

    /// Requested lattice node absent locally (internal, omitted from deltas)
    #[error("Lattice node not found: {id}")]
    NodeNotFound {
        /// The requested id
        id: String,
    },

    /// Backing TTL store or file store unreachable
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<latticesync_core::CoreError> for FederationError {
    fn from(err: latticesync_core::CoreError) -> Self {
        match err {
            latticesync_core::CoreError::Serialization(inner) => {
                FederationError::Serialization(inner)
            }
            latticesync_core::CoreError::Io(inner) => inner.into(),
        }
    }
}

impl From<redis::RedisError> for FederationError {
    fn from(err: redis::RedisError) -> Self {
        FederationError::StoreUnavailable(err.to_string())
    }
}

impl From<std::io::Error> for FederationError {
    fn from(err: std::io::Error) -> Self {
        FederationError::StoreUnavailable(err.to_string())
    }
}

/// Result type for federation operations.
pub type FederationResult<T> = Result<T, FederationError>;
