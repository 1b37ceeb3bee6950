//! HTTP implementation of the management API.
//!
//! Follows the peatio management API layout: every call is a JSON request
//! under `{base}/api/v2/peatio/management`, reads included (reads are POSTs
//! with an empty body). Requests carry a bearer token.

use crate::api::ManagementApi;
use crate::error::{ApiError, ApiResult};
use crate::params::{
    CreateBlockchainCurrencyParams, CreateCurrencyParams, CreateMarketParams, CreateWalletParams,
    UpdateMarketParams, UpdateWalletParams,
};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sonic_core::{BoxFuture, Currency, Market, Network, Wallet};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

/// Default timeout for management API requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Error body returned by the management API.
///
/// `errors` is either a list of messages or a map of field -> messages.
#[derive(Debug, Deserialize)]
struct RawErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    errors: Option<RawErrors>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawErrors {
    List(Vec<String>),
    Fields(BTreeMap<String, Vec<String>>),
}

/// Empty JSON object sent with read requests.
#[derive(Serialize)]
struct Empty {}

/// Client for the peatio management API.
pub struct PeatioClient {
    client: Client,
    /// Management API root (e.g., "http://peatio:8000/api/v2/peatio/management").
    base_url: String,
    token: String,
}

impl PeatioClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> ApiResult<Self> {
        Self::with_timeout(base_url, token, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    async fn call<B, T>(&self, method: Method, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(method = %method, url = %url, "Management API request");

        let mut request = self.client.request(method, &url).json(body);
        if !self.token.is_empty() {
            request = request.bearer_auth(&self.token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::transport(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::new(Some(status.as_u16()), format!("Can't read body: {e}")))?;

        if !status.is_success() {
            return Err(Self::decode_error(status.as_u16(), &text));
        }

        serde_json::from_str(&text).map_err(|e| {
            ApiError::new(
                Some(status.as_u16()),
                format!("Failed to parse response: {e}"),
            )
        })
    }

    fn decode_error(status: u16, body: &str) -> ApiError {
        let mut error = ApiError::new(Some(status), format!("HTTP {status}"));

        let raw = match serde_json::from_str::<RawErrorBody>(body) {
            Ok(raw) => raw,
            Err(_) => {
                if !body.is_empty() {
                    error.message = format!("HTTP {status}: {body}");
                }
                return error;
            }
        };

        let has_message = raw.error.is_some();
        if let Some(message) = raw.error {
            error.message = message;
        }
        match raw.errors {
            Some(RawErrors::Fields(fields)) => error.errors = fields,
            Some(RawErrors::List(list)) => {
                if !has_message {
                    if let Some(first) = list.first() {
                        error.message = first.clone();
                    }
                }
                error.errors.insert("base".to_string(), list);
            }
            None => {}
        }

        error
    }
}

impl ManagementApi for PeatioClient {
    fn get_currency<'a>(&'a self, code: &'a str) -> BoxFuture<'a, ApiResult<Currency>> {
        Box::pin(async move {
            self.call::<_, Currency>(Method::POST, &format!("/currencies/{code}"), &Empty {})
                .await
        })
    }

    fn create_currency(&self, params: CreateCurrencyParams) -> BoxFuture<'_, ApiResult<Currency>> {
        Box::pin(async move { self.call::<_, Currency>(Method::POST, "/currencies/create", &params).await })
    }

    fn get_blockchain_currency<'a>(&'a self, id: &'a str) -> BoxFuture<'a, ApiResult<Network>> {
        Box::pin(async move {
            self.call::<_, Network>(Method::POST, &format!("/blockchain_currencies/{id}"), &Empty {})
                .await
        })
    }

    fn create_blockchain_currency(
        &self,
        params: CreateBlockchainCurrencyParams,
    ) -> BoxFuture<'_, ApiResult<Network>> {
        Box::pin(async move {
            self.call::<_, Network>(Method::POST, "/blockchain_currencies/new", &params)
                .await
        })
    }

    fn get_market<'a>(&'a self, id: &'a str) -> BoxFuture<'a, ApiResult<Market>> {
        Box::pin(async move {
            self.call::<_, Market>(Method::POST, &format!("/markets/{id}"), &Empty {})
                .await
        })
    }

    fn create_market(&self, params: CreateMarketParams) -> BoxFuture<'_, ApiResult<Market>> {
        Box::pin(async move { self.call::<_, Market>(Method::POST, "/markets/new", &params).await })
    }

    fn update_market(&self, params: UpdateMarketParams) -> BoxFuture<'_, ApiResult<Market>> {
        Box::pin(async move { self.call::<_, Market>(Method::PUT, "/markets/update", &params).await })
    }

    fn list_wallets(&self) -> BoxFuture<'_, ApiResult<Vec<Wallet>>> {
        Box::pin(async move { self.call::<_, Vec<Wallet>>(Method::POST, "/wallets", &Empty {}).await })
    }

    fn get_wallet(&self, id: u64) -> BoxFuture<'_, ApiResult<Wallet>> {
        Box::pin(async move {
            self.call::<_, Wallet>(Method::POST, &format!("/wallets/{id}"), &Empty {})
                .await
        })
    }

    fn create_wallet(&self, params: CreateWalletParams) -> BoxFuture<'_, ApiResult<Wallet>> {
        Box::pin(async move { self.call::<_, Wallet>(Method::POST, "/wallets/new", &params).await })
    }

    fn update_wallet(&self, params: UpdateWalletParams) -> BoxFuture<'_, ApiResult<Wallet>> {
        Box::pin(async move { self.call::<_, Wallet>(Method::PUT, "/wallets/update", &params).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{post, put};
    use axum::{Json, Router};
    use rust_decimal_macros::dec;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/api/v2/peatio/management")
    }

    #[test]
    fn test_decode_error_with_field_map() {
        let err = PeatioClient::decode_error(
            422,
            r#"{"error":"Validation failed","errors":{"code":["has already been taken"]}}"#,
        );
        assert_eq!(err.status, Some(422));
        assert_eq!(err.message, "Validation failed");
        assert_eq!(err.errors["code"], vec!["has already been taken"]);
    }

    #[test]
    fn test_decode_error_with_list() {
        let err = PeatioClient::decode_error(404, r#"{"errors":["Couldn't find record."]}"#);
        assert!(err.is_not_found());
        assert_eq!(err.message, "Couldn't find record.");
        assert_eq!(err.errors["base"], vec!["Couldn't find record."]);
    }

    #[test]
    fn test_decode_error_plain_body() {
        let err = PeatioClient::decode_error(502, "bad gateway");
        assert_eq!(err.message, "HTTP 502: bad gateway");
    }

    #[tokio::test]
    async fn test_get_currency_found_and_missing() {
        let router = Router::new()
            .route(
                "/api/v2/peatio/management/currencies/btc",
                post(|| async { r#"{"id":"btc","name":"Bitcoin","type":"coin","price":"39100.0"}"# }),
            )
            .route(
                "/api/v2/peatio/management/currencies/xrp",
                post(|| async { (StatusCode::NOT_FOUND, r#"{"errors":["Couldn't find record."]}"#) }),
            );
        let client = PeatioClient::new(serve(router).await, "").unwrap();

        let btc = client.get_currency("btc").await.unwrap();
        assert_eq!(btc.name, "Bitcoin");
        assert_eq!(btc.price, dec!(39100.0));

        let err = client.get_currency("xrp").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_update_market_sends_bearer_token_and_body() {
        async fn update(headers: HeaderMap, Json(body): Json<serde_json::Value>) -> (StatusCode, String) {
            let auth = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            if auth != "Bearer secret-token" {
                return (StatusCode::UNAUTHORIZED, r#"{"error":"unauthorized"}"#.to_string());
            }
            let reply = serde_json::json!({
                "id": body["id"],
                "min_price": body["min_price"],
                "engine_id": body["engine_id"],
            });
            (StatusCode::OK, reply.to_string())
        }

        let router = Router::new().route("/api/v2/peatio/management/markets/update", put(update));
        let url = serve(router).await;

        let client = PeatioClient::new(url.clone(), "secret-token").unwrap();
        let market = client
            .update_market(UpdateMarketParams {
                id: "btcusdt".to_string(),
                engine_id: Some(7),
                min_price: dec!(0.5),
                max_price: dec!(100000),
                min_amount: dec!(0.001),
            })
            .await
            .unwrap();
        assert_eq!(market.id, "btcusdt");
        assert_eq!(market.min_price, dec!(0.5));
        assert_eq!(market.engine_id, Some(7));

        let anonymous = PeatioClient::new(url, "").unwrap();
        let err = anonymous
            .update_market(UpdateMarketParams {
                id: "btcusdt".to_string(),
                engine_id: None,
                min_price: dec!(0.5),
                max_price: dec!(100000),
                min_amount: dec!(0.001),
            })
            .await
            .unwrap_err();
        assert_eq!(err.status, Some(401));
        assert_eq!(err.message, "unauthorized");
    }
}
