//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] sonic_telemetry::TelemetryError),

    #[error("Cache error: {0}")]
    Cache(#[from] sonic_cache::CacheError),

    #[error("Sync error: {0}")]
    Sync(#[from] sonic_sync::SyncError),

    #[error("Server error: {0}")]
    Server(#[from] sonic_server::ServerError),

    #[error("Task failed: {0}")]
    Task(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
