//! Server error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Can't bind port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("Server failed: {0}")]
    Serve(#[from] std::io::Error),
}

pub type ServerResult<T> = Result<T, ServerError>;
