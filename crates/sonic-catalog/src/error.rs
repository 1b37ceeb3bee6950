//! Catalog client error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(String),

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Unexpected status: {0}")]
    Status(u16),

    #[error("Can't decode response: {0}")]
    Decode(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;
