//! HTTP client for the control-plane catalog.
//!
//! `GET {addr}/api/v2/opx/config` (with a `PlatformID` header) returns the
//! full catalog; `GET {addr}/api/v2/opx/markets` returns markets only.

use crate::error::{CatalogError, CatalogResult};
use reqwest::Client;
use serde::de::DeserializeOwned;
use sonic_core::{BoxFuture, Catalog, Market};
use std::time::Duration;
use tracing::{debug, error, info};

/// Catalog endpoint path.
pub const CONFIG_PATH: &str = "/api/v2/opx/config";

/// Markets-only endpoint path.
pub const MARKETS_PATH: &str = "/api/v2/opx/markets";

/// Header carrying the platform identifier.
pub const PLATFORM_ID_HEADER: &str = "PlatformID";

/// Default timeout for catalog requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of catalog snapshots.
///
/// Implemented by [`CatalogClient`]; daemons depend on the trait so they can
/// be driven by fixed snapshots in tests.
pub trait CatalogSource: Send + Sync {
    /// Fetch the full catalog for a platform.
    fn fetch_config<'a>(&'a self, platform_id: &'a str) -> BoxFuture<'a, CatalogResult<Catalog>>;

    /// Fetch the markets-only listing.
    fn fetch_markets(&self) -> BoxFuture<'_, CatalogResult<Vec<Market>>>;
}

/// Client for the opendax control-plane.
pub struct CatalogClient {
    /// HTTP client.
    client: Client,
    /// Base address (e.g., "https://cloud.opendax.app").
    base_url: String,
}

impl CatalogClient {
    /// Create a client with the default request timeout.
    pub fn new(base_url: impl Into<String>) -> CatalogResult<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with an explicit request timeout.
    ///
    /// An unresponsive control-plane would otherwise stall a whole
    /// reconciliation tick.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> CatalogResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the full catalog (currencies with networks, and markets).
    pub async fn fetch_config(&self, platform_id: &str) -> CatalogResult<Catalog> {
        let catalog: Catalog = self.get_json(CONFIG_PATH, Some(platform_id)).await?;
        info!(
            currencies = catalog.currencies.len(),
            markets = catalog.markets.len(),
            "Fetched catalog from control-plane"
        );
        Ok(catalog)
    }

    /// Fetch the markets-only listing.
    pub async fn fetch_markets(&self) -> CatalogResult<Vec<Market>> {
        let markets: Vec<Market> = self.get_json(MARKETS_PATH, None).await?;
        info!(markets = markets.len(), "Fetched markets from control-plane");
        Ok(markets)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        platform_id: Option<&str>,
    ) -> CatalogResult<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Requesting control-plane");

        let mut request = self.client.get(&url);
        if let Some(platform_id) = platform_id {
            request = request.header(PLATFORM_ID_HEADER, platform_id);
        }

        let response = request.send().await.map_err(|e| {
            error!(url = %url, error = %e, "Control-plane request failed");
            CatalogError::Transport(e.to_string())
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!(url = %url, status = status.as_u16(), error = %e, "Can't read response body");
            CatalogError::Transport(e.to_string())
        })?;

        if status != reqwest::StatusCode::OK {
            error!(url = %url, status = status.as_u16(), "Unexpected status");
            return Err(CatalogError::Status(status.as_u16()));
        }

        serde_json::from_str(&body).map_err(|e| {
            error!(url = %url, error = %e, "Can't decode response");
            CatalogError::Decode(e.to_string())
        })
    }
}

impl CatalogSource for CatalogClient {
    fn fetch_config<'a>(&'a self, platform_id: &'a str) -> BoxFuture<'a, CatalogResult<Catalog>> {
        Box::pin(CatalogClient::fetch_config(self, platform_id))
    }

    fn fetch_markets(&self) -> BoxFuture<'_, CatalogResult<Vec<Market>>> {
        Box::pin(CatalogClient::fetch_markets(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use rust_decimal_macros::dec;

    const CONFIG_BODY: &str = r#"{"currencies":[{"id":"btc","name":"Bitcoin","description":"","homepage":"","price":"39100.0","status":"enabled","type":"coin","precision":6,"position":4,"icon_url":"","networks":[]}],"markets":[{"id":"omgusdt","name":"OMG/USDT","base_unit":"omg","quote_unit":"usdt","state":"enabled","amount_precision":2,"price_precision":4,"min_price":"0.0037","max_price":"3687.4597","min_amount":"0.01","position":9}]}"#;

    const MARKETS_BODY: &str = r#"[{"id":"omgusdt","name":"OMG/USDT","base_unit":"omg","quote_unit":"usdt","state":"enabled","amount_precision":2,"price_precision":4,"min_price":"0.0037","max_price":"3687.4597","min_amount":"0.01","position":9},{"id":"uniusdt","name":"UNI/USDT","base_unit":"uni","quote_unit":"usdt","state":"enabled","amount_precision":2,"price_precision":4,"min_price":"0.0037","max_price":"3670","min_amount":"0.01","position":12}]"#;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn config_handler(headers: HeaderMap) -> (StatusCode, &'static str) {
        match headers.get(PLATFORM_ID_HEADER).and_then(|v| v.to_str().ok()) {
            Some("platform-1") => (StatusCode::OK, CONFIG_BODY),
            _ => (StatusCode::FORBIDDEN, ""),
        }
    }

    #[tokio::test]
    async fn test_fetch_config_success() {
        let url = serve(Router::new().route(CONFIG_PATH, get(config_handler))).await;
        let client = CatalogClient::new(url).unwrap();

        let catalog = client.fetch_config("platform-1").await.unwrap();
        assert_eq!(catalog.currencies.len(), 1);
        assert_eq!(catalog.currencies[0].id, "btc");
        assert_eq!(catalog.markets[0].min_price, dec!(0.0037));
    }

    #[tokio::test]
    async fn test_fetch_config_requires_platform_header() {
        let url = serve(Router::new().route(CONFIG_PATH, get(config_handler))).await;
        let client = CatalogClient::new(url).unwrap();

        let err = client.fetch_config("other").await.unwrap_err();
        assert!(matches!(err, CatalogError::Status(403)));
    }

    #[tokio::test]
    async fn test_fetch_config_empty_body() {
        let url = serve(Router::new().route(CONFIG_PATH, get(|| async { "{}" }))).await;
        let client = CatalogClient::new(url).unwrap();

        let catalog = client.fetch_config("platform-1").await.unwrap();
        assert!(catalog.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_config_not_found() {
        let url = serve(Router::new()).await;
        let client = CatalogClient::new(url).unwrap();

        let err = client.fetch_config("platform-1").await.unwrap_err();
        assert_eq!(err.to_string(), "Unexpected status: 404");
    }

    #[tokio::test]
    async fn test_fetch_markets_success() {
        let url = serve(Router::new().route(MARKETS_PATH, get(|| async { MARKETS_BODY }))).await;
        let client = CatalogClient::new(format!("{url}/")).unwrap();

        let markets = client.fetch_markets().await.unwrap();
        assert_eq!(markets.len(), 2);
        assert_eq!(markets[1].id, "uniusdt");
        assert_eq!(markets[1].max_price, dec!(3670));
    }

    #[tokio::test]
    async fn test_fetch_markets_decode_error() {
        let body = r#"{"error":"not a list"}"#;
        let url = serve(Router::new().route(MARKETS_PATH, get(move || async move { body }))).await;
        let client = CatalogClient::new(url).unwrap();

        let err = client.fetch_markets().await.unwrap_err();
        assert!(matches!(err, CatalogError::Decode(_)));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = CatalogClient::with_timeout(format!("http://{addr}"), Duration::from_secs(2))
            .unwrap();
        let err = client.fetch_markets().await.unwrap_err();
        assert!(matches!(err, CatalogError::Transport(_)));
    }
}
