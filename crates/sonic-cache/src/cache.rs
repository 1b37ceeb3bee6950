//! Versioned secret cache.
//!
//! A refresh walks every application, decides per (app, scope) whether the
//! cached copy is stale and stages the reloaded scopes. Staged scopes are
//! published in one write-locked swap, so a reader sees either the whole
//! pre-refresh state or the whole post-refresh state. Any store error aborts
//! the refresh before anything is published.

use crate::error::CacheResult;
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::{Map, Value};
use sonic_telemetry::Metrics;
use sonic_vault::{Scope, SecretStore};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

/// Secrets of one (app, scope): key -> value.
pub type ScopeSecrets = Map<String, Value>;

/// Full cache content: app -> scope -> key -> value.
pub type CacheSnapshot = BTreeMap<String, BTreeMap<String, ScopeSecrets>>;

/// Outcome of one refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    pub apps: usize,
    /// (app, scope) pairs whose keys were fetched.
    pub reloaded: Vec<String>,
}

/// In-memory mirror of the secret store.
pub struct VersionedCache {
    store: Arc<dyn SecretStore>,
    data: RwLock<CacheSnapshot>,
    /// Version each cached (app, scope) was loaded at. Also serializes refreshes.
    versions: Mutex<HashMap<(String, Scope), u64>>,
}

impl VersionedCache {
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self {
            store,
            data: RwLock::new(CacheSnapshot::new()),
            versions: Mutex::new(HashMap::new()),
        }
    }

    /// Copy of the whole cache.
    pub fn snapshot(&self) -> CacheSnapshot {
        self.data.read().clone()
    }

    /// Cached secrets of one (app, scope).
    pub fn get(&self, app: &str, scope: Scope) -> Option<ScopeSecrets> {
        self.data
            .read()
            .get(app)
            .and_then(|scopes| scopes.get(scope.as_str()))
            .cloned()
    }

    /// Reload every stale (app, scope) pair of `scope`.
    ///
    /// A pair is stale when the store's working copy lags its latest version,
    /// when the cached copy was loaded at another version or never loaded,
    /// or when `force` is set. The first refresh after startup must be forced.
    pub async fn refresh(&self, scope: Scope, force: bool) -> CacheResult<RefreshReport> {
        let mut versions = self.versions.lock().await;
        let started = Instant::now();

        let result = self.stage_and_publish(scope, force, &mut versions).await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        match &result {
            Ok(report) => {
                Metrics::cache_refresh("ok", report.reloaded.len(), elapsed_ms);
                if report.reloaded.is_empty() {
                    debug!(scope = %scope, apps = report.apps, "Secret cache up to date");
                } else {
                    info!(
                        scope = %scope,
                        reloaded = ?report.reloaded,
                        elapsed_ms,
                        "Secret cache refreshed"
                    );
                }
            }
            Err(e) => {
                Metrics::cache_refresh("failed", 0, elapsed_ms);
                error!(scope = %scope, error = %e, "Secret cache refresh failed");
            }
        }
        result
    }

    async fn stage_and_publish(
        &self,
        scope: Scope,
        force: bool,
        versions: &mut HashMap<(String, Scope), u64>,
    ) -> CacheResult<RefreshReport> {
        let apps = self.store.list_app_names().await?;

        let mut staged: Vec<(String, ScopeSecrets, u64)> = Vec::new();
        for app in &apps {
            self.store.load_secrets(app, scope).await?;
            let current = self.store.current_version(app, scope).await?;
            let latest = self.store.latest_version(app, scope).await?;

            let cached = versions.get(&(app.clone(), scope)).copied();
            let stale = force || current != latest || cached != Some(latest);
            if !stale {
                continue;
            }

            let mut secrets = ScopeSecrets::new();
            for key in self.store.list_secrets(app, scope).await? {
                if let Some(value) = self.store.get_secret(app, scope, &key).await? {
                    secrets.insert(key, value);
                }
            }
            staged.push((app.clone(), secrets, latest));
        }

        let mut report = RefreshReport {
            apps: apps.len(),
            reloaded: Vec::with_capacity(staged.len()),
        };

        let mut data = self.data.write();
        for app in &apps {
            data.entry(app.clone())
                .or_default()
                .entry(scope.as_str().to_string())
                .or_default();
        }
        for (app, secrets, version) in staged {
            data.entry(app.clone())
                .or_default()
                .insert(scope.as_str().to_string(), secrets);
            report.reloaded.push(format!("{app}/{scope}"));
            versions.insert((app, scope), version);
        }

        Ok(report)
    }

    /// Refresh `scope` every `interval`, starting one interval from now.
    ///
    /// Returns only when a refresh fails; the caller decides whether that is
    /// fatal.
    pub async fn run_refresher(self: Arc<Self>, scope: Scope, interval: Duration) -> CacheResult<()> {
        let start = tokio::time::Instant::now() + interval;
        let mut ticker = tokio::time::interval_at(start, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(scope = %scope, interval_secs = interval.as_secs(), "Secret cache refresher started");

        loop {
            ticker.tick().await;
            self.refresh(scope, false).await?;
        }
    }
}
