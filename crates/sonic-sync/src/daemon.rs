//! Full catalog reconciliation daemon.
//!
//! Each tick fetches the catalog and walks it in order: currencies and their
//! networks, markets, then wallets. Every step is existence-checked, so a
//! tick that stopped halfway is simply repeated by the next one. Failures of
//! individual items are logged and counted; they never stop their siblings.

use crate::config::SyncConfig;
use crate::error::SyncResult;
use crate::grouping::divide_into_groups;
use crate::restart::spawn_restart_signal;
use crate::settings;
use crate::wallets::{find_currencies_in_wallets, merge_currencies, wallet_pair};
use serde::Serialize;
use sonic_catalog::CatalogSource;
use sonic_core::{BoxFuture, Currency, Market, Network, Wallet, CLOUD_BLOCKCHAIN_KEY};
use sonic_peatio::{
    ApiError, CreateBlockchainCurrencyParams, CreateCurrencyParams, CreateMarketParams,
    ManagementApi, UpdateMarketParams, UpdateWalletParams,
};
use sonic_telemetry::Metrics;
use sonic_vault::SecretStore;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Engine assigned to markets created by full reconciliation.
pub const MARKET_ENGINE_NAME: &str = "opendax-cloud-engine";

/// Outcome of one reconciliation tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    pub currencies_created: usize,
    pub networks_created: usize,
    pub markets_created: usize,
    pub markets_updated: usize,
    pub wallets_created: usize,
    pub wallets_updated: usize,
    /// Items whose lookup, create or update failed.
    pub failures: usize,
    /// A market's bounds were rewritten; the engine should reload.
    pub should_restart: bool,
}

impl TickReport {
    /// Total create and update calls that succeeded.
    pub fn changes(&self) -> usize {
        self.currencies_created
            + self.networks_created
            + self.markets_created
            + self.markets_updated
            + self.wallets_created
            + self.wallets_updated
    }

    fn failed(&mut self, kind: &str) {
        self.failures += 1;
        Metrics::sync_item(kind, "failed");
    }
}

/// Runs a reconciliation tick on demand.
pub trait SyncTrigger: Send + Sync {
    /// Run one gated tick. `Ok(None)` when reconciliation is disabled.
    fn trigger(&self) -> BoxFuture<'_, SyncResult<Option<TickReport>>>;
}

/// Replicates the control-plane catalog into the management API.
pub struct ReconciliationDaemon {
    catalog: Arc<dyn CatalogSource>,
    api: Arc<dyn ManagementApi>,
    store: Arc<dyn SecretStore>,
    config: SyncConfig,
    /// Control-plane address, used for the wallet gateway URI.
    opendax_addr: String,
    /// Serializes timer ticks and on-demand triggers.
    tick_lock: Mutex<()>,
}

impl ReconciliationDaemon {
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        api: Arc<dyn ManagementApi>,
        store: Arc<dyn SecretStore>,
        config: SyncConfig,
        opendax_addr: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            api,
            store,
            config,
            opendax_addr: opendax_addr.into(),
            tick_lock: Mutex::new(()),
        }
    }

    /// Tick on the configured interval for the life of the process.
    pub async fn run(&self) {
        let mut ticker = tokio::time::interval(self.config.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval_secs = self.config.interval_secs, "Reconciliation daemon started");

        loop {
            ticker.tick().await;
            if let Err(e) = self.tick().await {
                error!(error = %e, "Reconciliation tick aborted");
            }
        }
    }

    /// One gated tick: checks the XLN flag, reads the platform id, reconciles
    /// and fires the restart signal when market bounds changed.
    pub async fn tick(&self) -> SyncResult<Option<TickReport>> {
        let _guard = self.tick_lock.lock().await;

        match settings::xln_enabled(self.store.as_ref()).await {
            Ok(true) => {}
            Ok(false) => {
                debug!("XLN disabled, skipping reconciliation");
                Metrics::sync_tick("skipped");
                return Ok(None);
            }
            Err(e) => {
                warn!(error = %e, "Can't read XLN flag, skipping reconciliation");
                Metrics::sync_tick("skipped");
                return Ok(None);
            }
        }

        let platform_id = settings::platform_id(self.store.as_ref()).await?;
        let report = self.run_once(&platform_id).await?;

        if report.should_restart {
            spawn_restart_signal(self.store.clone());
        }
        Ok(Some(report))
    }

    /// Fetch the catalog and replicate it. Only the fetch can fail the tick.
    pub async fn run_once(&self, platform_id: &str) -> SyncResult<TickReport> {
        let catalog = match self.catalog.fetch_config(platform_id).await {
            Ok(catalog) => catalog,
            Err(e) => {
                Metrics::sync_tick("fetch_failed");
                return Err(e.into());
            }
        };
        if let Err(e) = catalog.validate() {
            warn!(error = %e, "Catalog failed validation");
        }
        let catalog = catalog.without(
            &self.config.currencies_blacklist,
            &self.config.markets_blacklist,
        );

        let mut report = TickReport::default();
        self.ensure_currencies_and_networks(&catalog.currencies, &mut report)
            .await;
        self.ensure_markets(&catalog.markets, &mut report).await;
        self.reconcile_wallets(&catalog.currencies, &mut report)
            .await;

        Metrics::sync_tick("ok");
        info!(
            currencies = catalog.currencies.len(),
            markets = catalog.markets.len(),
            changes = report.changes(),
            failures = report.failures,
            should_restart = report.should_restart,
            "Reconciliation tick complete"
        );
        Ok(report)
    }

    /// Create missing currencies, then the networks of each created currency.
    /// Existing currencies are never touched. When a currency fails to create
    /// its networks are not attempted; the next tick retries both.
    pub async fn ensure_currencies_and_networks(
        &self,
        currencies: &[Currency],
        report: &mut TickReport,
    ) {
        for currency in currencies {
            match self.api.get_currency(&currency.id).await {
                Ok(_) => {
                    debug!(currency = %currency.id, "Currency exists");
                    Metrics::sync_item("currency", "skipped");
                    continue;
                }
                Err(e) if e.is_not_found() => {}
                Err(e) => {
                    log_api_error("Can't look up currency", &currency.id, &e);
                    report.failed("currency");
                    continue;
                }
            }

            if let Err(e) = self.api.create_currency(currency_params(currency)).await {
                log_api_error("Can't create currency", &currency.id, &e);
                report.failed("currency");
                continue;
            }
            info!(currency = %currency.id, "Currency created");
            report.currencies_created += 1;
            Metrics::sync_item("currency", "created");

            for network in &currency.networks {
                self.ensure_network(currency, network, report).await;
            }
        }
    }

    async fn ensure_network(&self, currency: &Currency, network: &Network, report: &mut TickReport) {
        match self.api.get_blockchain_currency(&network.id).await {
            Ok(_) => {
                Metrics::sync_item("network", "skipped");
                return;
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => {
                log_api_error("Can't look up network", &network.id, &e);
                report.failed("network");
                return;
            }
        }

        match self
            .api
            .create_blockchain_currency(network_params(currency, network))
            .await
        {
            Ok(_) => {
                info!(
                    currency = %currency.id,
                    blockchain_key = %network.blockchain_key,
                    "Network created"
                );
                report.networks_created += 1;
                Metrics::sync_item("network", "created");
            }
            Err(e) => {
                log_api_error("Can't create network", &currency.id, &e);
                report.failed("network");
            }
        }
    }

    /// Create missing markets; rewrite bounds of existing ones when the
    /// incoming minimum price or amount is not lower than the current one.
    pub async fn ensure_markets(&self, markets: &[Market], report: &mut TickReport) {
        for market in markets {
            let existing = match self.api.get_market(&market.id).await {
                Ok(existing) => existing,
                Err(e) if e.is_not_found() => {
                    match self
                        .api
                        .create_market(market_params(market, MARKET_ENGINE_NAME))
                        .await
                    {
                        Ok(_) => {
                            info!(market = %market.id, "Market created");
                            report.markets_created += 1;
                            Metrics::sync_item("market", "created");
                        }
                        Err(e) => {
                            log_api_error("Can't create market", &market.id, &e);
                            report.failed("market");
                        }
                    }
                    continue;
                }
                Err(e) => {
                    log_api_error("Can't look up market", &market.id, &e);
                    report.failed("market");
                    continue;
                }
            };

            if !market.bounds_trigger_update(&existing) {
                Metrics::sync_item("market", "skipped");
                continue;
            }

            report.should_restart = true;
            let params = UpdateMarketParams {
                id: existing.id.clone(),
                engine_id: existing.engine_id,
                min_price: market.min_price,
                max_price: market.max_price,
                min_amount: market.min_amount,
            };
            match self.api.update_market(params).await {
                Ok(_) => {
                    info!(
                        market = %market.id,
                        min_price = %market.min_price,
                        min_amount = %market.min_amount,
                        "Market bounds updated"
                    );
                    report.markets_updated += 1;
                    Metrics::sync_item("market", "updated");
                }
                Err(e) => {
                    log_api_error("Can't update market", &market.id, &e);
                    report.failed("market");
                }
            }
        }
    }

    /// Group currencies and make sure every group has its wallets.
    pub async fn reconcile_wallets(&self, currencies: &[Currency], report: &mut TickReport) {
        let wallets = match self.api.list_wallets().await {
            Ok(wallets) => wallets,
            Err(e) => {
                log_api_error("Can't list wallets", "*", &e);
                report.failed("wallet");
                return;
            }
        };

        let groups = divide_into_groups(currencies);
        for (key, group) in &groups {
            if wallets.is_empty() {
                self.create_wallet_pair(key, group, report).await;
                continue;
            }

            let matches = find_currencies_in_wallets(&wallets, group);
            for wallet in &matches.partial {
                self.merge_into_wallet(wallet, group, report).await;
            }
            if matches.is_none() {
                self.create_wallet_pair(key, group, report).await;
            } else if matches.partial.is_empty() {
                Metrics::sync_item("wallet", "skipped");
            }
        }
    }

    async fn merge_into_wallet(&self, wallet: &Wallet, group: &[String], report: &mut TickReport) {
        let current = match self.api.get_wallet(wallet.id).await {
            Ok(current) => current,
            Err(e) => {
                log_api_error("Can't fetch wallet", &wallet.id.to_string(), &e);
                report.failed("wallet");
                return;
            }
        };

        let Some(currencies) = merge_currencies(&current.currencies, group) else {
            return;
        };
        let params = UpdateWalletParams {
            id: current.id,
            currencies,
        };
        match self.api.update_wallet(params).await {
            Ok(updated) => {
                info!(
                    wallet = updated.id,
                    currencies = ?updated.currencies,
                    "Wallet currencies merged"
                );
                report.wallets_updated += 1;
                Metrics::sync_item("wallet", "updated");
            }
            Err(e) => {
                log_api_error("Can't update wallet currencies", &wallet.id.to_string(), &e);
                report.failed("wallet");
            }
        }
    }

    /// Create the deposit wallet, then the hot wallet if that succeeded.
    async fn create_wallet_pair(&self, key: &str, group: &[String], report: &mut TickReport) {
        let Some(pair) = wallet_pair(group, &self.opendax_addr) else {
            return;
        };

        for params in [pair.deposit, pair.hot] {
            let name = params.name.clone();
            match self.api.create_wallet(params).await {
                Ok(wallet) => {
                    info!(group = key, wallet = wallet.id, name = %name, "Wallet created");
                    report.wallets_created += 1;
                    Metrics::sync_item("wallet", "created");
                }
                Err(e) => {
                    log_api_error("Can't create wallet", &name, &e);
                    report.failed("wallet");
                    return;
                }
            }
        }
    }
}

impl SyncTrigger for ReconciliationDaemon {
    fn trigger(&self) -> BoxFuture<'_, SyncResult<Option<TickReport>>> {
        Box::pin(self.tick())
    }
}

fn log_api_error(message: &str, item: &str, error: &ApiError) {
    warn!(
        item,
        status = ?error.status,
        error = %error,
        errors = ?error.errors,
        "{message}"
    );
}

fn currency_params(currency: &Currency) -> CreateCurrencyParams {
    CreateCurrencyParams {
        code: currency.id.clone(),
        currency_type: currency.currency_type.as_str().to_string(),
        name: currency.name.clone(),
        status: currency.status.clone(),
        precision: currency.precision,
        price: currency.price,
        icon_url: currency.icon_url.clone(),
        description: currency.description.clone(),
        homepage: currency.homepage.clone(),
    }
}

/// Coin networks are bound to the cloud blockchain; fiat ones get no key.
fn network_params(currency: &Currency, network: &Network) -> CreateBlockchainCurrencyParams {
    let blockchain_key = if currency.is_coin() {
        CLOUD_BLOCKCHAIN_KEY.to_string()
    } else {
        String::new()
    };

    CreateBlockchainCurrencyParams {
        currency_id: network.currency_id.clone(),
        blockchain_key,
        parent_id: network.parent_id.clone(),
        base_factor: network.base_factor,
        deposit_fee: network.deposit_fee,
        min_deposit_amount: network.min_deposit_amount,
        min_collection_amount: network.min_collection_amount,
        withdraw_fee: network.withdraw_fee,
        min_withdraw_amount: network.min_withdraw_amount,
        deposit_enabled: network.deposit_enabled,
        withdraw_enabled: network.withdraw_enabled,
        status: network.status.clone(),
        options: network.options.clone(),
    }
}

pub(crate) fn market_params(market: &Market, engine_name: &str) -> CreateMarketParams {
    CreateMarketParams {
        base_currency: market.base_unit.clone(),
        quote_currency: market.quote_unit.clone(),
        state: "disabled".to_string(),
        engine_name: engine_name.to_string(),
        amount_precision: market.amount_precision,
        price_precision: market.price_precision,
        min_price: market.min_price,
        max_price: market.max_price,
        min_amount: market.min_amount,
        position: market.position,
    }
}
