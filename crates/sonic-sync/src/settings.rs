//! Platform settings kept in the secret store.

use serde_json::Value;
use sonic_vault::{require_secret, Scope, SecretStore, VaultError, VaultResult};

/// Application holding the synchronizer settings.
pub const SETTINGS_APP: &str = "sonic";

pub const PLATFORM_ID_KEY: &str = "platform_id";

/// Gate for the full reconciliation daemon.
pub const XLN_ENABLED_KEY: &str = "xln_enabled";

/// Platform identifier sent to the control-plane.
pub async fn platform_id(store: &dyn SecretStore) -> VaultResult<String> {
    match require_secret(store, SETTINGS_APP, Scope::Private, PLATFORM_ID_KEY).await? {
        Value::String(id) if !id.is_empty() => Ok(id),
        other => Err(VaultError::InvalidValue {
            key: PLATFORM_ID_KEY.to_string(),
            message: format!("expected a non-empty string, got {other}"),
        }),
    }
}

/// Whether full reconciliation is enabled. An absent flag means disabled.
pub async fn xln_enabled(store: &dyn SecretStore) -> VaultResult<bool> {
    store.load_secrets(SETTINGS_APP, Scope::Private).await?;
    match store
        .get_secret(SETTINGS_APP, Scope::Private, XLN_ENABLED_KEY)
        .await?
    {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(enabled)) => Ok(enabled),
        Some(other) => Err(VaultError::InvalidValue {
            key: XLN_ENABLED_KEY.to_string(),
            message: format!("expected a boolean, got {other}"),
        }),
    }
}
