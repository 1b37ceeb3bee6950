//! Markets-only replication.
//!
//! Lighter than full reconciliation: pulls the bare market listing and
//! creates the markets the engine lacks. Existing markets are never updated.

use crate::config::SyncConfig;
use crate::daemon::{market_params, TickReport};
use crate::error::SyncResult;
use sonic_catalog::CatalogSource;
use sonic_peatio::ManagementApi;
use sonic_telemetry::Metrics;
use std::sync::Arc;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

/// Engine assigned to markets created from the markets listing.
pub const MARKETS_ENGINE_NAME: &str = "opendax_cloud";

pub struct MarketsDaemon {
    catalog: Arc<dyn CatalogSource>,
    api: Arc<dyn ManagementApi>,
    config: SyncConfig,
}

impl MarketsDaemon {
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        api: Arc<dyn ManagementApi>,
        config: SyncConfig,
    ) -> Self {
        Self {
            catalog,
            api,
            config,
        }
    }

    pub async fn run(&self) {
        let mut ticker = tokio::time::interval(self.config.markets_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            interval_secs = self.config.markets_interval_secs,
            "Markets daemon started"
        );

        loop {
            ticker.tick().await;
            if let Err(e) = self.run_once().await {
                error!(error = %e, "Markets fetch aborted");
            }
        }
    }

    pub async fn run_once(&self) -> SyncResult<TickReport> {
        let markets = match self.catalog.fetch_markets().await {
            Ok(markets) => markets,
            Err(e) => {
                Metrics::sync_tick("fetch_failed");
                return Err(e.into());
            }
        };

        let mut report = TickReport::default();
        for market in markets
            .iter()
            .filter(|m| !self.config.is_market_blacklisted(&m.id))
        {
            match self.api.get_market(&market.id).await {
                Ok(_) => Metrics::sync_item("market", "skipped"),
                Err(e) if e.is_not_found() => {
                    match self
                        .api
                        .create_market(market_params(market, MARKETS_ENGINE_NAME))
                        .await
                    {
                        Ok(_) => {
                            info!(market = %market.id, "Market created");
                            report.markets_created += 1;
                            Metrics::sync_item("market", "created");
                        }
                        Err(e) => {
                            warn!(market = %market.id, error = %e, errors = ?e.errors, "Can't create market");
                            report.failures += 1;
                            Metrics::sync_item("market", "failed");
                        }
                    }
                }
                Err(e) => {
                    warn!(market = %market.id, error = %e, "Can't look up market");
                    report.failures += 1;
                    Metrics::sync_item("market", "failed");
                }
            }
        }

        Metrics::sync_tick("ok");
        info!(
            markets = markets.len(),
            created = report.markets_created,
            "Markets fetch complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sonic_catalog::{CatalogError, CatalogResult};
    use sonic_core::{BoxFuture, Catalog, Market};
    use sonic_peatio::{ApiCall, MockManagementApi};

    struct Listing(Result<Vec<Market>, u16>);

    impl CatalogSource for Listing {
        fn fetch_config<'a>(&'a self, _platform_id: &'a str) -> BoxFuture<'a, CatalogResult<Catalog>> {
            Box::pin(async move { Ok(Catalog::default()) })
        }

        fn fetch_markets(&self) -> BoxFuture<'_, CatalogResult<Vec<Market>>> {
            Box::pin(async move { self.0.clone().map_err(CatalogError::Status) })
        }
    }

    fn market(id: &str, base: &str, min_price: rust_decimal::Decimal) -> Market {
        Market {
            id: id.to_string(),
            base_unit: base.to_string(),
            quote_unit: "usdt".to_string(),
            min_price,
            max_price: dec!(3687.4597),
            min_amount: dec!(0.01),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_creates_missing_markets_only() {
        let api = Arc::new(MockManagementApi::new());
        api.seed_market(market("omgusdt", "omg", dec!(0.001)));
        let listing = Listing(Ok(vec![
            market("omgusdt", "omg", dec!(0.0037)),
            market("uniusdt", "uni", dec!(0.0037)),
        ]));
        let daemon = MarketsDaemon::new(Arc::new(listing), api.clone(), SyncConfig::default());

        let report = daemon.run_once().await.unwrap();
        assert_eq!(report.markets_created, 1);
        assert_eq!(report.markets_updated, 0);

        let uni = api.market("uniusdt").unwrap();
        assert_eq!(uni.state, "disabled");
        // Existing market keeps its bounds even though the listing is higher.
        assert_eq!(api.market("omgusdt").unwrap().min_price, dec!(0.001));
        assert!(!api
            .calls()
            .iter()
            .any(|c| matches!(c, ApiCall::UpdateMarket(_))));
    }

    #[tokio::test]
    async fn test_fetch_error_is_returned() {
        let api = Arc::new(MockManagementApi::new());
        let daemon = MarketsDaemon::new(Arc::new(Listing(Err(502))), api.clone(), SyncConfig::default());

        let err = daemon.run_once().await.unwrap_err();
        assert!(err.to_string().contains("Unexpected status: 502"));
        assert!(api.calls().is_empty());
    }
}
