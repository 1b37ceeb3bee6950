//! Currencies and their blockchain networks.

use crate::error::{CoreError, Result};
use crate::serde_helpers::{lenient_decimal, lenient_string};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Currency type as published by the control-plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyType {
    Coin,
    Fiat,
    /// Missing or unrecognised type.
    #[default]
    #[serde(other)]
    Unknown,
}

impl CurrencyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CurrencyType::Coin => "coin",
            CurrencyType::Fiat => "fiat",
            CurrencyType::Unknown => "",
        }
    }
}

impl fmt::Display for CurrencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A currency and the networks it can be moved on.
///
/// `id` is the currency code (e.g. "btc") and is unique within a catalog.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Currency {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub homepage: String,
    #[serde(deserialize_with = "lenient_decimal")]
    pub price: Decimal,
    pub status: String,
    #[serde(rename = "type")]
    pub currency_type: CurrencyType,
    pub precision: u32,
    pub position: i64,
    pub icon_url: String,
    pub networks: Vec<Network>,
}

impl Currency {
    pub fn is_coin(&self) -> bool {
        self.currency_type == CurrencyType::Coin
    }

    /// The network that decides wallet grouping for this currency.
    ///
    /// Only the first network is inspected: every network of one currency is
    /// expected to share the same parent. Use [`Currency::check_uniform_parent`]
    /// to verify that precondition.
    pub fn grouping_network(&self) -> Option<&Network> {
        self.networks.first()
    }

    /// Verify that all networks of this currency share one parent.
    pub fn check_uniform_parent(&self) -> Result<()> {
        let mut parents: Vec<String> = self.networks.iter().map(|n| n.parent_id.clone()).collect();
        parents.sort();
        parents.dedup();

        if parents.len() > 1 {
            return Err(CoreError::MixedNetworkParents {
                currency: self.id.clone(),
                parents,
            });
        }
        Ok(())
    }
}

/// A currency's representation on one blockchain (a "blockchain currency").
///
/// An empty `parent_id` marks the network as the anchor of a wallet group;
/// otherwise `parent_id` names the anchor currency. An empty `blockchain_key`
/// marks a fiat network.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Network {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    pub currency_id: String,
    pub blockchain_key: String,
    #[serde(deserialize_with = "lenient_string")]
    pub parent_id: String,
    pub status: String,
    #[serde(rename = "type")]
    pub network_type: String,
    pub deposit_enabled: bool,
    #[serde(rename = "withdrawal_enabled")]
    pub withdraw_enabled: bool,
    #[serde(deserialize_with = "lenient_decimal")]
    pub deposit_fee: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub min_deposit_amount: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub withdraw_fee: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub min_withdraw_amount: Decimal,
    pub base_factor: u64,
    pub min_confirmations: u64,
    #[serde(deserialize_with = "lenient_decimal")]
    pub min_collection_amount: Decimal,
    pub options: serde_json::Map<String, serde_json::Value>,
}

impl Network {
    pub fn is_fiat(&self) -> bool {
        self.blockchain_key.is_empty()
    }

    pub fn is_group_anchor(&self) -> bool {
        self.parent_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn network(currency: &str, parent: &str) -> Network {
        Network {
            currency_id: currency.to_string(),
            blockchain_key: "eth-rinkeby".to_string(),
            parent_id: parent.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_currency_deserialization() {
        let json = r#"{"id":"btc","name":"Bitcoin","description":"","homepage":"","price":"39100.0","status":"enabled","type":"coin","precision":6,"position":4,"icon_url":"","networks":[]}"#;
        let currency: Currency = serde_json::from_str(json).unwrap();
        assert_eq!(currency.id, "btc");
        assert_eq!(currency.price, dec!(39100.0));
        assert!(currency.is_coin());
        assert_eq!(currency.precision, 6);
        assert!(currency.networks.is_empty());
    }

    #[test]
    fn test_network_deserialization() {
        let json = r#"{"blockchain_key":"btc-testnet","currency_id":"btc","deposit_enabled":false,"withdrawal_enabled":true,"deposit_fee":"0.0","min_deposit_amount":"0.0","withdraw_fee":"0.0000000002557544","min_withdraw_amount":"0.0000000025575447","base_factor":1000000000000000000}"#;
        let network: Network = serde_json::from_str(json).unwrap();
        assert_eq!(network.currency_id, "btc");
        assert!(network.withdraw_enabled);
        assert!(!network.deposit_enabled);
        assert_eq!(network.withdraw_fee, dec!(0.0000000002557544));
        assert_eq!(network.base_factor, 1_000_000_000_000_000_000);
        assert!(network.is_group_anchor());
        assert!(!network.is_fiat());
    }

    #[test]
    fn test_unknown_currency_type() {
        let currency: Currency = serde_json::from_str(r#"{"id":"pts","type":"points"}"#).unwrap();
        assert_eq!(currency.currency_type, CurrencyType::Unknown);
        assert!(!currency.is_coin());
    }

    #[test]
    fn test_uniform_parent_check() {
        let uniform = Currency {
            id: "usdt".to_string(),
            networks: vec![network("usdt", "eth"), network("usdt", "eth")],
            ..Default::default()
        };
        assert!(uniform.check_uniform_parent().is_ok());

        let mixed = Currency {
            id: "link".to_string(),
            networks: vec![network("link", "eth"), network("link", "")],
            ..Default::default()
        };
        assert!(matches!(
            mixed.check_uniform_parent(),
            Err(CoreError::MixedNetworkParents { .. })
        ));
        // Grouping still follows the first network.
        assert_eq!(mixed.grouping_network().unwrap().parent_id, "eth");
    }
}
