//! Management API trait.

use crate::error::ApiResult;
use crate::params::{
    CreateBlockchainCurrencyParams, CreateCurrencyParams, CreateMarketParams, CreateWalletParams,
    UpdateMarketParams, UpdateWalletParams,
};
use sonic_core::{BoxFuture, Currency, Market, Network, Wallet};

/// Operations the synchronizer needs from the trading-engine management API.
///
/// Lookups return an [`crate::ApiError`] with status 404 when the resource is
/// absent. There are no multi-resource transactions: every call stands alone.
pub trait ManagementApi: Send + Sync {
    /// Look up a currency by code.
    fn get_currency<'a>(&'a self, code: &'a str) -> BoxFuture<'a, ApiResult<Currency>>;

    fn create_currency(&self, params: CreateCurrencyParams) -> BoxFuture<'_, ApiResult<Currency>>;

    /// Look up a blockchain currency (network) by id.
    fn get_blockchain_currency<'a>(&'a self, id: &'a str) -> BoxFuture<'a, ApiResult<Network>>;

    fn create_blockchain_currency(
        &self,
        params: CreateBlockchainCurrencyParams,
    ) -> BoxFuture<'_, ApiResult<Network>>;

    /// Look up a market by id.
    fn get_market<'a>(&'a self, id: &'a str) -> BoxFuture<'a, ApiResult<Market>>;

    fn create_market(&self, params: CreateMarketParams) -> BoxFuture<'_, ApiResult<Market>>;

    fn update_market(&self, params: UpdateMarketParams) -> BoxFuture<'_, ApiResult<Market>>;

    /// List every wallet.
    fn list_wallets(&self) -> BoxFuture<'_, ApiResult<Vec<Wallet>>>;

    fn get_wallet(&self, id: u64) -> BoxFuture<'_, ApiResult<Wallet>>;

    fn create_wallet(&self, params: CreateWalletParams) -> BoxFuture<'_, ApiResult<Wallet>>;

    fn update_wallet(&self, params: UpdateWalletParams) -> BoxFuture<'_, ApiResult<Wallet>>;
}
