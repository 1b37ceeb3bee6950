//! Secret store trait.

use crate::error::{VaultError, VaultResult};
use crate::scope::Scope;
use serde_json::Value;
use sonic_core::BoxFuture;

/// Operations on a versioned, (app, scope)-partitioned secret store.
pub trait SecretStore: Send + Sync {
    /// Names of every application holding secrets.
    fn list_app_names(&self) -> BoxFuture<'_, VaultResult<Vec<String>>>;

    /// Pull the stored secrets of (app, scope) into the working copy.
    ///
    /// A pair with no stored secrets loads as empty at version 0.
    fn load_secrets<'a>(&'a self, app: &'a str, scope: Scope) -> BoxFuture<'a, VaultResult<()>>;

    /// Read a key from the working copy. `None` when the key is absent.
    fn get_secret<'a>(
        &'a self,
        app: &'a str,
        scope: Scope,
        key: &'a str,
    ) -> BoxFuture<'a, VaultResult<Option<Value>>>;

    /// Write a key into the working copy; persisted by [`SecretStore::save_secrets`].
    fn set_secret<'a>(
        &'a self,
        app: &'a str,
        scope: Scope,
        key: &'a str,
        value: Value,
    ) -> BoxFuture<'a, VaultResult<()>>;

    /// Persist the working copy, creating a new version.
    fn save_secrets<'a>(&'a self, app: &'a str, scope: Scope) -> BoxFuture<'a, VaultResult<()>>;

    /// Version of the working copy (as of the last load or save).
    fn current_version<'a>(&'a self, app: &'a str, scope: Scope) -> BoxFuture<'a, VaultResult<u64>>;

    /// Latest stored version, read from the store itself.
    fn latest_version<'a>(&'a self, app: &'a str, scope: Scope) -> BoxFuture<'a, VaultResult<u64>>;

    /// Keys of the working copy, sorted.
    fn list_secrets<'a>(
        &'a self,
        app: &'a str,
        scope: Scope,
    ) -> BoxFuture<'a, VaultResult<Vec<String>>>;
}

/// Load (app, scope) and read `key`, failing when it is absent.
pub async fn require_secret(
    store: &dyn SecretStore,
    app: &str,
    scope: Scope,
    key: &str,
) -> VaultResult<Value> {
    store.load_secrets(app, scope).await?;
    store
        .get_secret(app, scope, key)
        .await?
        .ok_or_else(|| VaultError::KeyNotFound {
            app: app.to_string(),
            scope: scope.to_string(),
            key: key.to_string(),
        })
}

/// Loaded secrets of one (app, scope) pair.
#[derive(Debug, Clone, Default)]
pub(crate) struct WorkingCopy {
    pub data: serde_json::Map<String, Value>,
    pub version: u64,
}

pub(crate) fn not_loaded(app: &str, scope: Scope) -> VaultError {
    VaultError::NotLoaded {
        app: app.to_string(),
        scope: scope.to_string(),
    }
}
