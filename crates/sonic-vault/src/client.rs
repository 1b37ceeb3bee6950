//! Vault KV v2 client.
//!
//! Secrets of (app, scope) live at `secret/data/{deployment}/{app}/{scope}`;
//! versions come from `secret/metadata/...`. Applications are the child keys
//! of `secret/metadata/{deployment}`.

use crate::error::{VaultError, VaultResult};
use crate::scope::Scope;
use crate::store::{not_loaded, SecretStore, WorkingCopy};
use parking_lot::Mutex;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use sonic_core::BoxFuture;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error};

const TOKEN_HEADER: &str = "X-Vault-Token";

/// Default timeout for vault requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct SecretData {
    #[serde(default)]
    data: Option<Map<String, Value>>,
    metadata: VersionMetadata,
}

#[derive(Debug, Deserialize)]
struct VersionMetadata {
    version: u64,
}

#[derive(Debug, Deserialize)]
struct SecretMetadata {
    current_version: u64,
}

#[derive(Debug, Deserialize)]
struct KeyList {
    keys: Vec<String>,
}

/// Vault-backed secret store.
pub struct VaultClient {
    client: Client,
    /// Vault address (e.g., "http://vault:8200").
    addr: String,
    token: String,
    deployment_id: String,
    loaded: Mutex<HashMap<(String, Scope), WorkingCopy>>,
}

impl VaultClient {
    pub fn new(
        addr: impl Into<String>,
        token: impl Into<String>,
        deployment_id: impl Into<String>,
    ) -> VaultResult<Self> {
        Self::with_timeout(addr, token, deployment_id, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        addr: impl Into<String>,
        token: impl Into<String>,
        deployment_id: impl Into<String>,
        timeout: Duration,
    ) -> VaultResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VaultError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            addr: addr.into().trim_end_matches('/').to_string(),
            token: token.into(),
            deployment_id: deployment_id.into(),
            loaded: Mutex::new(HashMap::new()),
        })
    }

    fn data_url(&self, app: &str, scope: Scope) -> String {
        format!(
            "{}/v1/secret/data/{}/{}/{}",
            self.addr, self.deployment_id, app, scope
        )
    }

    fn metadata_url(&self, app: &str, scope: Scope) -> String {
        format!(
            "{}/v1/secret/metadata/{}/{}/{}",
            self.addr, self.deployment_id, app, scope
        )
    }

    /// Send a request; `Ok(None)` when vault answers 404.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> VaultResult<Option<T>> {
        let response = request
            .header(TOKEN_HEADER, &self.token)
            .send()
            .await
            .map_err(|e| VaultError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| VaultError::Transport(e.to_string()))?;

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            error!(status = status.as_u16(), body = %body, "Vault request failed");
            return Err(VaultError::Status {
                status: status.as_u16(),
                message: body,
            });
        }

        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| VaultError::Decode(e.to_string()))
    }

    async fn fetch_app_names(&self) -> VaultResult<Vec<String>> {
        let url = format!("{}/v1/secret/metadata/{}", self.addr, self.deployment_id);
        let listing: Option<Envelope<KeyList>> = self
            .send(self.client.get(&url).query(&[("list", "true")]))
            .await?;

        Ok(listing
            .map(|l| l.data.keys)
            .unwrap_or_default()
            .into_iter()
            .map(|key| key.trim_end_matches('/').to_string())
            .collect())
    }

    async fn fetch_secrets(&self, app: &str, scope: Scope) -> VaultResult<()> {
        let url = self.data_url(app, scope);
        debug!(app, scope = %scope, "Loading secrets");

        let secret: Option<Envelope<SecretData>> = self.send(self.client.get(&url)).await?;
        let copy = match secret {
            Some(envelope) => WorkingCopy {
                data: envelope.data.data.unwrap_or_default(),
                version: envelope.data.metadata.version,
            },
            None => WorkingCopy::default(),
        };

        self.loaded.lock().insert((app.to_string(), scope), copy);
        Ok(())
    }

    async fn store_secrets(&self, app: &str, scope: Scope) -> VaultResult<()> {
        let data = self
            .loaded
            .lock()
            .get(&(app.to_string(), scope))
            .map(|copy| copy.data.clone())
            .ok_or_else(|| not_loaded(app, scope))?;

        let url = self.data_url(app, scope);
        let written: Option<Envelope<VersionMetadata>> = self
            .send(self.client.post(&url).json(&json!({ "data": data })))
            .await?;
        let written = written.ok_or_else(|| VaultError::Status {
            status: 404,
            message: format!("Can't write {url}"),
        })?;

        if let Some(copy) = self.loaded.lock().get_mut(&(app.to_string(), scope)) {
            copy.version = written.data.version;
        }
        Ok(())
    }

    async fn fetch_latest_version(&self, app: &str, scope: Scope) -> VaultResult<u64> {
        let metadata: Option<Envelope<SecretMetadata>> = self
            .send(self.client.get(self.metadata_url(app, scope)))
            .await?;
        Ok(metadata.map(|m| m.data.current_version).unwrap_or(0))
    }

    fn with_copy<T>(
        &self,
        app: &str,
        scope: Scope,
        f: impl FnOnce(&mut WorkingCopy) -> T,
    ) -> VaultResult<T> {
        let mut loaded = self.loaded.lock();
        let copy = loaded
            .get_mut(&(app.to_string(), scope))
            .ok_or_else(|| not_loaded(app, scope))?;
        Ok(f(copy))
    }
}

impl SecretStore for VaultClient {
    fn list_app_names(&self) -> BoxFuture<'_, VaultResult<Vec<String>>> {
        Box::pin(self.fetch_app_names())
    }

    fn load_secrets<'a>(&'a self, app: &'a str, scope: Scope) -> BoxFuture<'a, VaultResult<()>> {
        Box::pin(self.fetch_secrets(app, scope))
    }

    fn get_secret<'a>(
        &'a self,
        app: &'a str,
        scope: Scope,
        key: &'a str,
    ) -> BoxFuture<'a, VaultResult<Option<Value>>> {
        Box::pin(async move { self.with_copy(app, scope, |copy| copy.data.get(key).cloned()) })
    }

    fn set_secret<'a>(
        &'a self,
        app: &'a str,
        scope: Scope,
        key: &'a str,
        value: Value,
    ) -> BoxFuture<'a, VaultResult<()>> {
        Box::pin(async move {
            self.with_copy(app, scope, |copy| {
                copy.data.insert(key.to_string(), value);
            })
        })
    }

    fn save_secrets<'a>(&'a self, app: &'a str, scope: Scope) -> BoxFuture<'a, VaultResult<()>> {
        Box::pin(self.store_secrets(app, scope))
    }

    fn current_version<'a>(&'a self, app: &'a str, scope: Scope) -> BoxFuture<'a, VaultResult<u64>> {
        Box::pin(async move { self.with_copy(app, scope, |copy| copy.version) })
    }

    fn latest_version<'a>(&'a self, app: &'a str, scope: Scope) -> BoxFuture<'a, VaultResult<u64>> {
        Box::pin(self.fetch_latest_version(app, scope))
    }

    fn list_secrets<'a>(
        &'a self,
        app: &'a str,
        scope: Scope,
    ) -> BoxFuture<'a, VaultResult<Vec<String>>> {
        Box::pin(async move {
            self.with_copy(app, scope, |copy| {
                let mut keys: Vec<String> = copy.data.keys().cloned().collect();
                keys.sort();
                keys
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::HeaderMap;
    use axum::routing::get;
    use axum::{Json, Router};
    use std::sync::Arc;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    /// Minimal KV v2 backend holding one secret set per path.
    fn kv_router(store: Arc<Mutex<HashMap<String, (Value, u64)>>>) -> Router {
        let read = store.clone();
        let write = store.clone();
        let meta = store;
        Router::new()
            .route(
                "/v1/secret/data/{*path}",
                get(move |Path(path): Path<String>, headers: HeaderMap| {
                    let read = read.clone();
                    async move {
                        if headers.get(TOKEN_HEADER).and_then(|v| v.to_str().ok()) != Some("root") {
                            return (StatusCode::FORBIDDEN, String::new());
                        }
                        match read.lock().get(&path) {
                            Some((data, version)) => (
                                StatusCode::OK,
                                json!({"data": {"data": data, "metadata": {"version": version}}})
                                    .to_string(),
                            ),
                            None => (StatusCode::NOT_FOUND, r#"{"errors":[]}"#.to_string()),
                        }
                    }
                })
                .post(move |Path(path): Path<String>, Json(body): Json<Value>| {
                    let write = write.clone();
                    async move {
                        let mut store = write.lock();
                        let version = store.get(&path).map(|(_, v)| v + 1).unwrap_or(1);
                        store.insert(path, (body["data"].clone(), version));
                        json!({"data": {"version": version}}).to_string()
                    }
                }),
            )
            .route(
                "/v1/secret/metadata/{*path}",
                get(move |Path(path): Path<String>| {
                    let meta = meta.clone();
                    async move {
                        let store = meta.lock();
                        if path == "opendax-dev" {
                            let mut apps: Vec<String> = store
                                .keys()
                                .filter_map(|p| p.split('/').nth(1))
                                .map(|app| format!("{app}/"))
                                .collect();
                            apps.sort();
                            apps.dedup();
                            return (StatusCode::OK, json!({"data": {"keys": apps}}).to_string());
                        }
                        match store.get(&path) {
                            Some((_, version)) => (
                                StatusCode::OK,
                                json!({"data": {"current_version": version}}).to_string(),
                            ),
                            None => (StatusCode::NOT_FOUND, String::new()),
                        }
                    }
                }),
            )
    }

    #[tokio::test]
    async fn test_load_set_save_roundtrip() {
        let backend = Arc::new(Mutex::new(HashMap::new()));
        backend.lock().insert(
            "opendax-dev/sonic/public".to_string(),
            (json!({"theme": "dark"}), 3),
        );
        let url = serve(kv_router(backend.clone())).await;
        let vault = VaultClient::new(url, "root", "opendax-dev").unwrap();

        assert_eq!(vault.list_app_names().await.unwrap(), vec!["sonic"]);

        vault.load_secrets("sonic", Scope::Public).await.unwrap();
        assert_eq!(vault.current_version("sonic", Scope::Public).await.unwrap(), 3);
        assert_eq!(vault.latest_version("sonic", Scope::Public).await.unwrap(), 3);
        assert_eq!(
            vault.get_secret("sonic", Scope::Public, "theme").await.unwrap(),
            Some(json!("dark"))
        );

        vault
            .set_secret("sonic", Scope::Public, "lang", json!("en"))
            .await
            .unwrap();
        vault.save_secrets("sonic", Scope::Public).await.unwrap();
        assert_eq!(vault.current_version("sonic", Scope::Public).await.unwrap(), 4);
        assert_eq!(
            vault.list_secrets("sonic", Scope::Public).await.unwrap(),
            vec!["lang", "theme"]
        );
        assert_eq!(backend.lock()["opendax-dev/sonic/public"].0["lang"], "en");
    }

    #[tokio::test]
    async fn test_missing_path_loads_empty() {
        let url = serve(kv_router(Arc::new(Mutex::new(HashMap::new())))).await;
        let vault = VaultClient::new(url, "root", "opendax-dev").unwrap();

        vault.load_secrets("finex", Scope::Private).await.unwrap();
        assert_eq!(vault.current_version("finex", Scope::Private).await.unwrap(), 0);
        assert_eq!(vault.latest_version("finex", Scope::Private).await.unwrap(), 0);
        assert!(vault.list_secrets("finex", Scope::Private).await.unwrap().is_empty());
        assert!(vault.list_app_names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bad_token_is_status_error() {
        let url = serve(kv_router(Arc::new(Mutex::new(HashMap::new())))).await;
        let vault = VaultClient::new(url, "wrong", "opendax-dev").unwrap();

        let err = vault.load_secrets("sonic", Scope::Public).await.unwrap_err();
        assert!(matches!(err, VaultError::Status { status: 403, .. }));
        assert!(matches!(
            vault.get_secret("sonic", Scope::Public, "theme").await,
            Err(VaultError::NotLoaded { .. })
        ));
    }
}
