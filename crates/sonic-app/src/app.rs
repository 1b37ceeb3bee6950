//! Application wiring and task supervision.

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use sonic_cache::{RefreshReport, VersionedCache};
use sonic_catalog::{CatalogClient, CatalogSource};
use sonic_peatio::{ManagementApi, PeatioClient};
use sonic_server::{run_server, ServerState};
use sonic_sync::{MarketsDaemon, ReconciliationDaemon, SyncError, SyncTrigger};
use sonic_vault::{SecretStore, VaultClient};
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info, warn};

/// Main application.
pub struct Application {
    config: AppConfig,
    catalog: Arc<dyn CatalogSource>,
    api: Arc<dyn ManagementApi>,
    store: Arc<dyn SecretStore>,
    cache: Arc<VersionedCache>,
}

impl Application {
    /// Build the HTTP clients from configuration.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        config.validate().map_err(AppError::Config)?;

        let catalog = CatalogClient::with_timeout(
            config.opendax.addr.clone(),
            config.opendax.request_timeout(),
        )
        .map_err(SyncError::from)?;

        let api = PeatioClient::with_timeout(
            config.mngapi.peatio_url.clone(),
            config.mngapi.token.clone(),
            config.mngapi.request_timeout(),
        )
        .map_err(SyncError::from)?;

        if config.vault.token.is_empty() {
            warn!("Vault token is empty, secret store requests will be rejected");
        }
        let store = VaultClient::with_timeout(
            config.vault.addr.clone(),
            config.vault.token.clone(),
            config.vault.deployment_id.clone(),
            config.vault.request_timeout(),
        )
        .map_err(SyncError::from)?;

        Ok(Self::with_collaborators(
            config,
            Arc::new(catalog),
            Arc::new(api),
            Arc::new(store),
        ))
    }

    /// Build around existing collaborators.
    pub fn with_collaborators(
        config: AppConfig,
        catalog: Arc<dyn CatalogSource>,
        api: Arc<dyn ManagementApi>,
        store: Arc<dyn SecretStore>,
    ) -> Self {
        let cache = Arc::new(VersionedCache::new(store.clone()));
        Self {
            config,
            catalog,
            api,
            store,
            cache,
        }
    }

    pub fn cache(&self) -> Arc<VersionedCache> {
        self.cache.clone()
    }

    /// Load every application's secrets regardless of versions.
    ///
    /// Nothing survives a restart, so the first refresh must be forced.
    pub async fn warm_cache(&self) -> AppResult<RefreshReport> {
        let report = self.cache.refresh(self.config.cache.scope, true).await?;
        info!(
            apps = report.apps,
            reloaded = report.reloaded.len(),
            scope = %self.config.cache.scope,
            "Secret cache warmed"
        );
        Ok(report)
    }

    pub fn reconciliation_daemon(&self) -> ReconciliationDaemon {
        ReconciliationDaemon::new(
            self.catalog.clone(),
            self.api.clone(),
            self.store.clone(),
            self.config.sync.clone(),
            self.config.opendax.addr.clone(),
        )
    }

    pub fn markets_daemon(&self) -> MarketsDaemon {
        MarketsDaemon::new(
            self.catalog.clone(),
            self.api.clone(),
            self.config.sync.clone(),
        )
    }

    pub fn server_state(&self, trigger: Option<Arc<dyn SyncTrigger>>) -> ServerState {
        ServerState::new(self.cache.clone(), trigger, self.config.server.clone())
    }

    /// Spawn the configured sync daemon.
    ///
    /// Returns the handle and, for full reconciliation, the trigger the
    /// server exposes.
    fn spawn_sync(&self) -> (Option<JoinHandle<()>>, Option<Arc<dyn SyncTrigger>>) {
        if !self.config.sync.enabled {
            info!("Catalog sync disabled");
            return (None, None);
        }

        if self.config.sync.markets_only {
            let daemon = self.markets_daemon();
            let handle = tokio::spawn(async move { daemon.run().await });
            return (Some(handle), None);
        }

        let daemon = Arc::new(self.reconciliation_daemon());
        let runner = daemon.clone();
        let handle = tokio::spawn(async move { runner.run().await });
        let trigger: Arc<dyn SyncTrigger> = daemon;
        (Some(handle), Some(trigger))
    }

    /// Run until the refresher fails, the server or sync daemon stops, or Ctrl-C.
    pub async fn run(self) -> AppResult<()> {
        self.warm_cache().await?;

        let (mut sync_handle, trigger) = self.spawn_sync();

        let mut server = tokio::spawn(run_server(self.server_state(trigger)));

        let scope = self.config.cache.scope;
        let interval = self.config.cache.refresh_interval();
        let mut refresher = tokio::spawn(self.cache.clone().run_refresher(scope, interval));

        let result = tokio::select! {
            joined = &mut refresher => match joined {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => {
                    error!(error = %e, "Secret cache refresh failed, exiting");
                    Err(AppError::from(e))
                }
                Err(e) => Err(AppError::Task(e.to_string())),
            },
            joined = &mut server => match joined {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => {
                    error!(error = %e, "HTTP server stopped");
                    Err(AppError::from(e))
                }
                Err(e) => Err(AppError::Task(e.to_string())),
            },
            joined = join_sync(&mut sync_handle) => {
                let e = sync_stopped(joined);
                error!(error = %e, "Sync daemon stopped, exiting");
                Err(e)
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                Ok(())
            }
        };

        refresher.abort();
        server.abort();
        if let Some(handle) = sync_handle {
            handle.abort();
        }

        result
    }
}

/// Wait for the sync daemon. Never resolves when none was spawned.
async fn join_sync(handle: &mut Option<JoinHandle<()>>) -> Result<(), JoinError> {
    match handle {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

/// Daemon loops only end by panicking or being cancelled.
fn sync_stopped(joined: Result<(), JoinError>) -> AppError {
    match joined {
        Ok(()) => AppError::Task("sync daemon returned".to_string()),
        Err(e) if e.is_panic() => AppError::Task(format!("sync daemon panicked: {e}")),
        Err(e) => AppError::Task(e.to_string()),
    }
}
