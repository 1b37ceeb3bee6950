//! Cache error types.

use sonic_vault::VaultError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Secret store failed during cache refresh: {0}")]
    Store(#[from] VaultError),
}

pub type CacheResult<T> = Result<T, CacheError>;
