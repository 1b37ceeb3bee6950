//! Matching-engine restart signal.
//!
//! A one-way notification: the synchronizer stores the current unix
//! timestamp under `finex/private/finex_restart` and the engine picks it up
//! on its own schedule. Nothing acknowledges the signal.

use serde_json::Value;
use sonic_telemetry::Metrics;
use sonic_vault::{require_secret, Scope, SecretStore, VaultError, VaultResult};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

pub const RESTART_APP: &str = "finex";

pub const RESTART_KEY: &str = "finex_restart";

/// Store `timestamp` as the latest restart request.
pub async fn set_restart_signal(store: &dyn SecretStore, timestamp: i64) -> VaultResult<()> {
    store.load_secrets(RESTART_APP, Scope::Private).await?;
    store
        .set_secret(RESTART_APP, Scope::Private, RESTART_KEY, Value::from(timestamp))
        .await?;
    store.save_secrets(RESTART_APP, Scope::Private).await
}

/// Timestamp of the latest restart request.
pub async fn read_restart_signal(store: &dyn SecretStore) -> VaultResult<i64> {
    let value = require_secret(store, RESTART_APP, Scope::Private, RESTART_KEY).await?;
    value.as_i64().ok_or_else(|| VaultError::InvalidValue {
        key: RESTART_KEY.to_string(),
        message: format!("cannot convert {value} to a unix timestamp"),
    })
}

/// Write the restart signal from a detached task. Failures are logged only.
pub fn spawn_restart_signal(store: Arc<dyn SecretStore>) -> JoinHandle<()> {
    let timestamp = chrono::Utc::now().timestamp();
    tokio::spawn(async move {
        match set_restart_signal(store.as_ref(), timestamp).await {
            Ok(()) => {
                Metrics::restart_signal("ok");
                info!(timestamp, "Restart signal written");
            }
            Err(e) => {
                Metrics::restart_signal("failed");
                warn!(error = %e, timestamp, "Can't write restart signal");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sonic_vault::MemorySecretStore;

    #[tokio::test]
    async fn test_set_then_read() {
        let store = MemorySecretStore::new();
        set_restart_signal(&store, 1_700_000_000).await.unwrap();
        assert_eq!(read_restart_signal(&store).await.unwrap(), 1_700_000_000);
        assert_eq!(store.stored_version(RESTART_APP, Scope::Private), 1);
    }

    #[tokio::test]
    async fn test_read_rejects_non_integer() {
        let store = MemorySecretStore::new();
        store.put(RESTART_APP, Scope::Private, RESTART_KEY, json!("soon"));
        assert!(matches!(
            read_restart_signal(&store).await,
            Err(VaultError::InvalidValue { .. })
        ));
    }

    #[tokio::test]
    async fn test_spawned_signal_swallows_errors() {
        let store = Arc::new(MemorySecretStore::new());
        store.fail_with(VaultError::Transport("connection refused".to_string()));

        spawn_restart_signal(store.clone()).await.unwrap();
        store.clear_failure();
        assert!(read_restart_signal(store.as_ref()).await.is_err());

        spawn_restart_signal(store.clone()).await.unwrap();
        assert!(read_restart_signal(store.as_ref()).await.unwrap() > 0);
    }
}
