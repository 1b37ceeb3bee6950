//! Reconciliation error types.

use sonic_catalog::CatalogError;
use sonic_peatio::ApiError;
use sonic_vault::VaultError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Catalog fetch failed: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Secret store error: {0}")]
    Vault(#[from] VaultError),

    #[error("Management API error: {0}")]
    Api(#[from] ApiError),
}

pub type SyncResult<T> = Result<T, SyncError>;
