//! In-memory management API for tests.

use crate::api::ManagementApi;
use crate::error::{ApiError, ApiResult};
use crate::params::{
    CreateBlockchainCurrencyParams, CreateCurrencyParams, CreateMarketParams, CreateWalletParams,
    UpdateMarketParams, UpdateWalletParams,
};
use parking_lot::Mutex;
use sonic_core::{BoxFuture, Currency, CurrencyType, Market, Network, Wallet};
use std::collections::{BTreeMap, HashMap};

/// A recorded management API call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ApiCall {
    GetCurrency(String),
    CreateCurrency(String),
    GetBlockchainCurrency(String),
    /// Keyed by currency id.
    CreateBlockchainCurrency(String),
    GetMarket(String),
    CreateMarket(String),
    UpdateMarket(String),
    ListWallets,
    GetWallet(u64),
    /// Keyed by wallet name.
    CreateWallet(String),
    UpdateWallet(u64),
}

impl ApiCall {
    /// Create and update calls.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            ApiCall::CreateCurrency(_)
                | ApiCall::CreateBlockchainCurrency(_)
                | ApiCall::CreateMarket(_)
                | ApiCall::UpdateMarket(_)
                | ApiCall::CreateWallet(_)
                | ApiCall::UpdateWallet(_)
        )
    }
}

#[derive(Debug, Default)]
struct State {
    currencies: BTreeMap<String, Currency>,
    networks: Vec<Network>,
    markets: BTreeMap<String, Market>,
    wallets: BTreeMap<u64, Wallet>,
    next_wallet_id: u64,
    calls: Vec<ApiCall>,
    failures: HashMap<ApiCall, ApiError>,
}

/// Mock management API backed by in-memory maps.
///
/// Records every call and lets tests inject a failure for a specific call.
#[derive(Debug, Default)]
pub struct MockManagementApi {
    state: Mutex<State>,
}

impl MockManagementApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `call` fail with `error` until [`MockManagementApi::clear_failures`].
    pub fn fail_on(&self, call: ApiCall, error: ApiError) {
        self.state.lock().failures.insert(call, error);
    }

    pub fn clear_failures(&self) {
        self.state.lock().failures.clear();
    }

    pub fn seed_currency(&self, currency: Currency) {
        self.state
            .lock()
            .currencies
            .insert(currency.id.clone(), currency);
    }

    pub fn seed_market(&self, market: Market) {
        self.state.lock().markets.insert(market.id.clone(), market);
    }

    /// Insert a wallet; an id of 0 gets the next free id.
    pub fn seed_wallet(&self, mut wallet: Wallet) -> u64 {
        let mut state = self.state.lock();
        if wallet.id == 0 {
            state.next_wallet_id += 1;
            wallet.id = state.next_wallet_id;
        } else {
            state.next_wallet_id = state.next_wallet_id.max(wallet.id);
        }
        let id = wallet.id;
        state.wallets.insert(id, wallet);
        id
    }

    /// Recorded calls, in order.
    pub fn calls(&self) -> Vec<ApiCall> {
        self.state.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Recorded create and update calls.
    pub fn mutations(&self) -> Vec<ApiCall> {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| c.is_mutation())
            .cloned()
            .collect()
    }

    pub fn currencies(&self) -> Vec<Currency> {
        self.state.lock().currencies.values().cloned().collect()
    }

    pub fn networks(&self) -> Vec<Network> {
        self.state.lock().networks.clone()
    }

    pub fn markets(&self) -> Vec<Market> {
        self.state.lock().markets.values().cloned().collect()
    }

    pub fn market(&self, id: &str) -> Option<Market> {
        self.state.lock().markets.get(id).cloned()
    }

    /// Wallets ordered by id.
    pub fn wallets(&self) -> Vec<Wallet> {
        self.state.lock().wallets.values().cloned().collect()
    }

    /// Record `call` and return its injected failure, if any.
    fn record(state: &mut State, call: ApiCall) -> ApiResult<()> {
        let failure = state.failures.get(&call).cloned();
        state.calls.push(call);
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn do_get_currency(&self, code: &str) -> ApiResult<Currency> {
        let mut state = self.state.lock();
        Self::record(&mut state, ApiCall::GetCurrency(code.to_string()))?;
        state
            .currencies
            .get(code)
            .cloned()
            .ok_or_else(|| ApiError::not_found(format!("currency {code}")))
    }

    fn do_create_currency(&self, params: CreateCurrencyParams) -> ApiResult<Currency> {
        let mut state = self.state.lock();
        Self::record(&mut state, ApiCall::CreateCurrency(params.code.clone()))?;
        if state.currencies.contains_key(&params.code) {
            return Err(ApiError::new(Some(422), "Validation failed")
                .with_field_error("code", "has already been taken"));
        }

        let currency_type = match params.currency_type.as_str() {
            "coin" => CurrencyType::Coin,
            "fiat" => CurrencyType::Fiat,
            _ => CurrencyType::Unknown,
        };
        let currency = Currency {
            id: params.code.clone(),
            name: params.name,
            description: params.description,
            homepage: params.homepage,
            price: params.price,
            status: params.status,
            currency_type,
            precision: params.precision,
            icon_url: params.icon_url,
            ..Default::default()
        };
        state.currencies.insert(params.code, currency.clone());
        Ok(currency)
    }

    fn do_get_blockchain_currency(&self, id: &str) -> ApiResult<Network> {
        let mut state = self.state.lock();
        Self::record(&mut state, ApiCall::GetBlockchainCurrency(id.to_string()))?;
        state
            .networks
            .iter()
            .find(|n| n.id == id)
            .cloned()
            .ok_or_else(|| ApiError::not_found(format!("blockchain currency {id}")))
    }

    fn do_create_blockchain_currency(
        &self,
        params: CreateBlockchainCurrencyParams,
    ) -> ApiResult<Network> {
        let mut state = self.state.lock();
        Self::record(
            &mut state,
            ApiCall::CreateBlockchainCurrency(params.currency_id.clone()),
        )?;
        if !state.currencies.contains_key(&params.currency_id) {
            return Err(ApiError::new(Some(422), "Validation failed")
                .with_field_error("currency_id", "does not exist"));
        }

        let network = Network {
            id: (state.networks.len() + 1).to_string(),
            currency_id: params.currency_id,
            blockchain_key: params.blockchain_key,
            parent_id: params.parent_id,
            status: params.status,
            deposit_enabled: params.deposit_enabled,
            withdraw_enabled: params.withdraw_enabled,
            deposit_fee: params.deposit_fee,
            min_deposit_amount: params.min_deposit_amount,
            withdraw_fee: params.withdraw_fee,
            min_withdraw_amount: params.min_withdraw_amount,
            base_factor: params.base_factor,
            min_collection_amount: params.min_collection_amount,
            options: params.options,
            ..Default::default()
        };
        state.networks.push(network.clone());
        Ok(network)
    }

    fn do_get_market(&self, id: &str) -> ApiResult<Market> {
        let mut state = self.state.lock();
        Self::record(&mut state, ApiCall::GetMarket(id.to_string()))?;
        state
            .markets
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::not_found(format!("market {id}")))
    }

    fn do_create_market(&self, params: CreateMarketParams) -> ApiResult<Market> {
        let id = format!("{}{}", params.base_currency, params.quote_currency);
        let mut state = self.state.lock();
        Self::record(&mut state, ApiCall::CreateMarket(id.clone()))?;
        if state.markets.contains_key(&id) {
            return Err(ApiError::new(Some(422), "Validation failed")
                .with_field_error("id", "has already been taken"));
        }

        let market = Market {
            id: id.clone(),
            name: format!(
                "{}/{}",
                params.base_currency.to_uppercase(),
                params.quote_currency.to_uppercase()
            ),
            base_unit: params.base_currency,
            quote_unit: params.quote_currency,
            state: params.state,
            amount_precision: params.amount_precision,
            price_precision: params.price_precision,
            min_price: params.min_price,
            max_price: params.max_price,
            min_amount: params.min_amount,
            position: params.position,
            engine_id: None,
        };
        state.markets.insert(id, market.clone());
        Ok(market)
    }

    fn do_update_market(&self, params: UpdateMarketParams) -> ApiResult<Market> {
        let mut state = self.state.lock();
        Self::record(&mut state, ApiCall::UpdateMarket(params.id.clone()))?;
        let market = state
            .markets
            .get_mut(&params.id)
            .ok_or_else(|| ApiError::not_found(format!("market {}", params.id)))?;

        market.min_price = params.min_price;
        market.max_price = params.max_price;
        market.min_amount = params.min_amount;
        if params.engine_id.is_some() {
            market.engine_id = params.engine_id;
        }
        Ok(market.clone())
    }

    fn do_list_wallets(&self) -> ApiResult<Vec<Wallet>> {
        let mut state = self.state.lock();
        Self::record(&mut state, ApiCall::ListWallets)?;
        Ok(state.wallets.values().cloned().collect())
    }

    fn do_get_wallet(&self, id: u64) -> ApiResult<Wallet> {
        let mut state = self.state.lock();
        Self::record(&mut state, ApiCall::GetWallet(id))?;
        state
            .wallets
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::not_found(format!("wallet {id}")))
    }

    fn do_create_wallet(&self, params: CreateWalletParams) -> ApiResult<Wallet> {
        let mut state = self.state.lock();
        Self::record(&mut state, ApiCall::CreateWallet(params.name.clone()))?;

        state.next_wallet_id += 1;
        let wallet = Wallet {
            id: state.next_wallet_id,
            name: params.name,
            kind: params.kind,
            currencies: params.currencies,
            address: params.address,
            gateway: params.gateway,
            blockchain_key: params.blockchain_key,
            status: params.status,
            ..Default::default()
        };
        state.wallets.insert(wallet.id, wallet.clone());
        Ok(wallet)
    }

    fn do_update_wallet(&self, params: UpdateWalletParams) -> ApiResult<Wallet> {
        let mut state = self.state.lock();
        Self::record(&mut state, ApiCall::UpdateWallet(params.id))?;
        let wallet = state
            .wallets
            .get_mut(&params.id)
            .ok_or_else(|| ApiError::not_found(format!("wallet {}", params.id)))?;
        wallet.currencies = params.currencies;
        Ok(wallet.clone())
    }
}

impl ManagementApi for MockManagementApi {
    fn get_currency<'a>(&'a self, code: &'a str) -> BoxFuture<'a, ApiResult<Currency>> {
        Box::pin(async move { self.do_get_currency(code) })
    }

    fn create_currency(&self, params: CreateCurrencyParams) -> BoxFuture<'_, ApiResult<Currency>> {
        Box::pin(async move { self.do_create_currency(params) })
    }

    fn get_blockchain_currency<'a>(&'a self, id: &'a str) -> BoxFuture<'a, ApiResult<Network>> {
        Box::pin(async move { self.do_get_blockchain_currency(id) })
    }

    fn create_blockchain_currency(
        &self,
        params: CreateBlockchainCurrencyParams,
    ) -> BoxFuture<'_, ApiResult<Network>> {
        Box::pin(async move { self.do_create_blockchain_currency(params) })
    }

    fn get_market<'a>(&'a self, id: &'a str) -> BoxFuture<'a, ApiResult<Market>> {
        Box::pin(async move { self.do_get_market(id) })
    }

    fn create_market(&self, params: CreateMarketParams) -> BoxFuture<'_, ApiResult<Market>> {
        Box::pin(async move { self.do_create_market(params) })
    }

    fn update_market(&self, params: UpdateMarketParams) -> BoxFuture<'_, ApiResult<Market>> {
        Box::pin(async move { self.do_update_market(params) })
    }

    fn list_wallets(&self) -> BoxFuture<'_, ApiResult<Vec<Wallet>>> {
        Box::pin(async move { self.do_list_wallets() })
    }

    fn get_wallet(&self, id: u64) -> BoxFuture<'_, ApiResult<Wallet>> {
        Box::pin(async move { self.do_get_wallet(id) })
    }

    fn create_wallet(&self, params: CreateWalletParams) -> BoxFuture<'_, ApiResult<Wallet>> {
        Box::pin(async move { self.do_create_wallet(params) })
    }

    fn update_wallet(&self, params: UpdateWalletParams) -> BoxFuture<'_, ApiResult<Wallet>> {
        Box::pin(async move { self.do_update_wallet(params) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::WalletSettings;
    use rust_decimal_macros::dec;
    use sonic_core::WalletKind;

    fn market_params() -> CreateMarketParams {
        CreateMarketParams {
            base_currency: "omg".to_string(),
            quote_currency: "usdt".to_string(),
            state: "disabled".to_string(),
            engine_name: "opendax-cloud-engine".to_string(),
            amount_precision: 2,
            price_precision: 4,
            min_price: dec!(0.0037),
            max_price: dec!(3687.4597),
            min_amount: dec!(0.01),
            position: 9,
        }
    }

    #[tokio::test]
    async fn test_missing_currency_is_not_found() {
        let api = MockManagementApi::new();
        let err = api.get_currency("btc").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(api.calls(), vec![ApiCall::GetCurrency("btc".to_string())]);
        assert!(api.mutations().is_empty());
    }

    #[tokio::test]
    async fn test_create_and_update_market() {
        let api = MockManagementApi::new();
        let created = api.create_market(market_params()).await.unwrap();
        assert_eq!(created.id, "omgusdt");
        assert_eq!(created.name, "OMG/USDT");

        let updated = api
            .update_market(UpdateMarketParams {
                id: "omgusdt".to_string(),
                engine_id: Some(2),
                min_price: dec!(0.004),
                max_price: dec!(4000),
                min_amount: dec!(0.02),
            })
            .await
            .unwrap();
        assert_eq!(updated.min_price, dec!(0.004));
        assert_eq!(api.market("omgusdt").unwrap().engine_id, Some(2));

        let duplicate = api.create_market(market_params()).await.unwrap_err();
        assert_eq!(duplicate.status, Some(422));
    }

    #[tokio::test]
    async fn test_injected_failure_is_recorded() {
        let api = MockManagementApi::new();
        api.fail_on(
            ApiCall::CreateMarket("omgusdt".to_string()),
            ApiError::new(Some(500), "boom"),
        );

        let err = api.create_market(market_params()).await.unwrap_err();
        assert_eq!(err.message, "boom");
        assert!(api.markets().is_empty());
        assert_eq!(api.mutations().len(), 1);

        api.clear_failures();
        assert!(api.create_market(market_params()).await.is_ok());
    }

    #[tokio::test]
    async fn test_wallet_ids_and_update() {
        let api = MockManagementApi::new();
        let seeded = api.seed_wallet(Wallet {
            id: 5,
            currencies: vec!["eth".to_string()],
            ..Default::default()
        });
        assert_eq!(seeded, 5);

        let created = api
            .create_wallet(CreateWalletParams {
                name: "BTC Deposit Wallet".to_string(),
                kind: WalletKind::Deposit,
                blockchain_key: "opendax-cloud".to_string(),
                gateway: "opendax_cloud".to_string(),
                address: "address".to_string(),
                currencies: vec!["btc".to_string()],
                status: "active".to_string(),
                settings: WalletSettings::default(),
            })
            .await
            .unwrap();
        assert_eq!(created.id, 6);

        let updated = api
            .update_wallet(UpdateWalletParams {
                id: 5,
                currencies: vec!["eth".to_string(), "link".to_string()],
            })
            .await
            .unwrap();
        assert_eq!(updated.currencies, vec!["eth", "link"]);
        assert!(api.get_wallet(42).await.unwrap_err().is_not_found());
        assert_eq!(api.wallets().len(), 2);
    }
}
