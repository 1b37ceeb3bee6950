//! Versioned secret cache.
//!
//! Mirrors one scope of every application in the secret store into memory
//! and reloads an (app, scope) pair only when its version moves.

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheSnapshot, RefreshReport, ScopeSecrets, VersionedCache};
pub use config::CacheConfig;
pub use error::{CacheError, CacheResult};
