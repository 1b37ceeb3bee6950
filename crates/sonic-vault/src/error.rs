//! Secret store error types.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VaultError {
    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(String),

    #[error("Vault request failed: {0}")]
    Transport(String),

    #[error("Vault returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Can't decode vault response: {0}")]
    Decode(String),

    #[error("Secrets of {app}/{scope} are not loaded")]
    NotLoaded { app: String, scope: String },

    #[error("Secret {key} not found in {app}/{scope}")]
    KeyNotFound {
        app: String,
        scope: String,
        key: String,
    },

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Unknown scope: {0}")]
    UnknownScope(String),
}

pub type VaultResult<T> = Result<T, VaultError>;
