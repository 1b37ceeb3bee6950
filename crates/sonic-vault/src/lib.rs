//! Secret store boundary.
//!
//! Secrets are addressed by (application, scope) and carry a version counter
//! per pair. Reads and writes go through a loaded working copy:
//! `load_secrets` pulls the stored set, `get_secret`/`set_secret` operate on
//! it, `save_secrets` writes it back and bumps the version.
//!
//! - [`SecretStore`]: dyn-compatible trait consumed by the daemons and cache
//! - [`VaultClient`]: vault KV v2 implementation
//! - [`MemorySecretStore`]: in-memory implementation for tests and local runs

pub mod client;
pub mod error;
pub mod memory;
pub mod scope;
pub mod store;

pub use client::VaultClient;
pub use error::{VaultError, VaultResult};
pub use memory::MemorySecretStore;
pub use scope::Scope;
pub use store::{require_secret, SecretStore};
