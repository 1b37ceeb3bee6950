//! In-memory secret store.

use crate::error::VaultResult;
use crate::scope::Scope;
use crate::store::{not_loaded, SecretStore, WorkingCopy};
use crate::VaultError;
use parking_lot::Mutex;
use serde_json::Value;
use sonic_core::BoxFuture;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Default)]
struct State {
    stored: BTreeMap<(String, Scope), WorkingCopy>,
    loaded: HashMap<(String, Scope), WorkingCopy>,
    get_secret_calls: usize,
    failure: Option<VaultError>,
}

/// Secret store kept in memory.
///
/// Every save bumps the pair's version. Tests can inject a failure that
/// every operation returns until cleared.
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    state: Mutex<State>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a key straight into the store as a new version.
    pub fn put(&self, app: &str, scope: Scope, key: &str, value: Value) {
        let mut state = self.state.lock();
        let entry = state.stored.entry((app.to_string(), scope)).or_default();
        entry.data.insert(key.to_string(), value);
        entry.version += 1;
    }

    /// Stored (not loaded) value of a key.
    pub fn stored_value(&self, app: &str, scope: Scope, key: &str) -> Option<Value> {
        self.state
            .lock()
            .stored
            .get(&(app.to_string(), scope))
            .and_then(|copy| copy.data.get(key).cloned())
    }

    pub fn stored_version(&self, app: &str, scope: Scope) -> u64 {
        self.state
            .lock()
            .stored
            .get(&(app.to_string(), scope))
            .map(|copy| copy.version)
            .unwrap_or(0)
    }

    /// Number of `get_secret` calls served so far.
    pub fn get_secret_calls(&self) -> usize {
        self.state.lock().get_secret_calls
    }

    pub fn fail_with(&self, error: VaultError) {
        self.state.lock().failure = Some(error);
    }

    pub fn clear_failure(&self) {
        self.state.lock().failure = None;
    }

    fn check(state: &State) -> VaultResult<()> {
        match &state.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn do_list_app_names(&self) -> VaultResult<Vec<String>> {
        let state = self.state.lock();
        Self::check(&state)?;
        let mut apps: Vec<String> = state.stored.keys().map(|(app, _)| app.clone()).collect();
        apps.dedup();
        Ok(apps)
    }

    fn do_load(&self, app: &str, scope: Scope) -> VaultResult<()> {
        let mut state = self.state.lock();
        Self::check(&state)?;
        let key = (app.to_string(), scope);
        let copy = state.stored.get(&key).cloned().unwrap_or_default();
        state.loaded.insert(key, copy);
        Ok(())
    }

    fn do_get(&self, app: &str, scope: Scope, key: &str) -> VaultResult<Option<Value>> {
        let mut state = self.state.lock();
        Self::check(&state)?;
        state.get_secret_calls += 1;
        let copy = state
            .loaded
            .get(&(app.to_string(), scope))
            .ok_or_else(|| not_loaded(app, scope))?;
        Ok(copy.data.get(key).cloned())
    }

    fn do_set(&self, app: &str, scope: Scope, key: &str, value: Value) -> VaultResult<()> {
        let mut state = self.state.lock();
        Self::check(&state)?;
        let copy = state
            .loaded
            .get_mut(&(app.to_string(), scope))
            .ok_or_else(|| not_loaded(app, scope))?;
        copy.data.insert(key.to_string(), value);
        Ok(())
    }

    fn do_save(&self, app: &str, scope: Scope) -> VaultResult<()> {
        let mut state = self.state.lock();
        Self::check(&state)?;
        let key = (app.to_string(), scope);
        let data = state
            .loaded
            .get(&key)
            .map(|copy| copy.data.clone())
            .ok_or_else(|| not_loaded(app, scope))?;

        let stored = state.stored.entry(key.clone()).or_default();
        stored.data = data;
        stored.version += 1;
        let version = stored.version;

        if let Some(copy) = state.loaded.get_mut(&key) {
            copy.version = version;
        }
        Ok(())
    }

    fn do_current_version(&self, app: &str, scope: Scope) -> VaultResult<u64> {
        let state = self.state.lock();
        Self::check(&state)?;
        state
            .loaded
            .get(&(app.to_string(), scope))
            .map(|copy| copy.version)
            .ok_or_else(|| not_loaded(app, scope))
    }

    fn do_latest_version(&self, app: &str, scope: Scope) -> VaultResult<u64> {
        let state = self.state.lock();
        Self::check(&state)?;
        Ok(state
            .stored
            .get(&(app.to_string(), scope))
            .map(|copy| copy.version)
            .unwrap_or(0))
    }

    fn do_list_secrets(&self, app: &str, scope: Scope) -> VaultResult<Vec<String>> {
        let state = self.state.lock();
        Self::check(&state)?;
        let copy = state
            .loaded
            .get(&(app.to_string(), scope))
            .ok_or_else(|| not_loaded(app, scope))?;
        let mut keys: Vec<String> = copy.data.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

impl SecretStore for MemorySecretStore {
    fn list_app_names(&self) -> BoxFuture<'_, VaultResult<Vec<String>>> {
        Box::pin(async move { self.do_list_app_names() })
    }

    fn load_secrets<'a>(&'a self, app: &'a str, scope: Scope) -> BoxFuture<'a, VaultResult<()>> {
        Box::pin(async move { self.do_load(app, scope) })
    }

    fn get_secret<'a>(
        &'a self,
        app: &'a str,
        scope: Scope,
        key: &'a str,
    ) -> BoxFuture<'a, VaultResult<Option<Value>>> {
        Box::pin(async move { self.do_get(app, scope, key) })
    }

    fn set_secret<'a>(
        &'a self,
        app: &'a str,
        scope: Scope,
        key: &'a str,
        value: Value,
    ) -> BoxFuture<'a, VaultResult<()>> {
        Box::pin(async move { self.do_set(app, scope, key, value) })
    }

    fn save_secrets<'a>(&'a self, app: &'a str, scope: Scope) -> BoxFuture<'a, VaultResult<()>> {
        Box::pin(async move { self.do_save(app, scope) })
    }

    fn current_version<'a>(&'a self, app: &'a str, scope: Scope) -> BoxFuture<'a, VaultResult<u64>> {
        Box::pin(async move { self.do_current_version(app, scope) })
    }

    fn latest_version<'a>(&'a self, app: &'a str, scope: Scope) -> BoxFuture<'a, VaultResult<u64>> {
        Box::pin(async move { self.do_latest_version(app, scope) })
    }

    fn list_secrets<'a>(
        &'a self,
        app: &'a str,
        scope: Scope,
    ) -> BoxFuture<'a, VaultResult<Vec<String>>> {
        Box::pin(async move { self.do_list_secrets(app, scope) })
    }
}
