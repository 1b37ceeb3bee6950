//! Request parameters for mutating management API calls.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sonic_core::WalletKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCurrencyParams {
    pub code: String,
    #[serde(rename = "type")]
    pub currency_type: String,
    pub name: String,
    pub status: String,
    pub precision: u32,
    pub price: Decimal,
    pub icon_url: String,
    pub description: String,
    pub homepage: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateBlockchainCurrencyParams {
    pub currency_id: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub blockchain_key: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub parent_id: String,
    pub base_factor: u64,
    pub deposit_fee: Decimal,
    pub min_deposit_amount: Decimal,
    pub min_collection_amount: Decimal,
    pub withdraw_fee: Decimal,
    pub min_withdraw_amount: Decimal,
    pub deposit_enabled: bool,
    #[serde(rename = "withdrawal_enabled")]
    pub withdraw_enabled: bool,
    pub status: String,
    pub options: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateMarketParams {
    pub base_currency: String,
    pub quote_currency: String,
    pub state: String,
    pub engine_name: String,
    pub amount_precision: i64,
    pub price_precision: i64,
    pub min_price: Decimal,
    pub max_price: Decimal,
    pub min_amount: Decimal,
    pub position: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateMarketParams {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub engine_id: Option<u64>,
    pub min_price: Decimal,
    pub max_price: Decimal,
    pub min_amount: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSettings {
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateWalletParams {
    pub name: String,
    pub kind: WalletKind,
    pub blockchain_key: String,
    pub gateway: String,
    pub address: String,
    pub currencies: Vec<String>,
    pub status: String,
    pub settings: WalletSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateWalletParams {
    pub id: u64,
    pub currencies: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_update_market_serialization_omits_missing_engine() {
        let params = UpdateMarketParams {
            id: "btcusdt".to_string(),
            engine_id: None,
            min_price: dec!(0.01),
            max_price: dec!(100000),
            min_amount: dec!(0.0001),
        };
        let json = serde_json::to_value(&params).unwrap();
        assert!(json.get("engine_id").is_none());
        assert_eq!(json["min_price"], "0.01");
    }

    #[test]
    fn test_network_params_omit_empty_blockchain_key() {
        let params = CreateBlockchainCurrencyParams {
            currency_id: "eur".to_string(),
            blockchain_key: String::new(),
            parent_id: String::new(),
            base_factor: 100,
            deposit_fee: Decimal::ZERO,
            min_deposit_amount: Decimal::ZERO,
            min_collection_amount: Decimal::ZERO,
            withdraw_fee: Decimal::ZERO,
            min_withdraw_amount: Decimal::ZERO,
            deposit_enabled: true,
            withdraw_enabled: true,
            status: "enabled".to_string(),
            options: serde_json::Map::new(),
        };
        let json = serde_json::to_value(&params).unwrap();
        assert!(json.get("blockchain_key").is_none());
        assert_eq!(json["withdrawal_enabled"], true);
    }
}
