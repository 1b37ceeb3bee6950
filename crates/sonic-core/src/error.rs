//! Error types for sonic-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Currency {currency} has networks with different parents: {parents:?}")]
    MixedNetworkParents {
        currency: String,
        parents: Vec<String>,
    },

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
