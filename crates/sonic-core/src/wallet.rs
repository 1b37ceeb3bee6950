//! Deposit and hot wallets.

use crate::serde_helpers::lenient_decimal;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wallet role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletKind {
    #[default]
    Deposit,
    Hot,
    Warm,
    Cold,
    Fee,
    #[serde(other)]
    Other,
}

impl WalletKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WalletKind::Deposit => "deposit",
            WalletKind::Hot => "hot",
            WalletKind::Warm => "warm",
            WalletKind::Cold => "cold",
            WalletKind::Fee => "fee",
            WalletKind::Other => "other",
        }
    }

    /// Human-readable label used in wallet names ("Deposit", "Hot").
    pub fn label(&self) -> &'static str {
        match self {
            WalletKind::Deposit => "Deposit",
            WalletKind::Hot => "Hot",
            WalletKind::Warm => "Warm",
            WalletKind::Cold => "Cold",
            WalletKind::Fee => "Fee",
            WalletKind::Other => "Other",
        }
    }
}

impl fmt::Display for WalletKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A wallet registered in the trading engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Wallet {
    pub id: u64,
    pub name: String,
    pub kind: WalletKind,
    pub currencies: Vec<String>,
    pub address: String,
    pub gateway: String,
    pub blockchain_key: String,
    pub status: String,
    pub balance: serde_json::Value,
    #[serde(deserialize_with = "lenient_decimal")]
    pub max_balance: Decimal,
}

impl Wallet {
    /// Wallet currencies in sorted order, for order-independent comparison.
    pub fn sorted_currencies(&self) -> Vec<String> {
        let mut currencies = self.currencies.clone();
        currencies.sort();
        currencies
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_deserialization() {
        let json = r#"{"id":3,"name":"ETH Hot Wallet","kind":"hot","currencies":["link","eth"],"address":"address","gateway":"opendax_cloud","blockchain_key":"opendax-cloud","status":"active","balance":{"eth":"0.0"},"max_balance":"0.0"}"#;
        let wallet: Wallet = serde_json::from_str(json).unwrap();
        assert_eq!(wallet.id, 3);
        assert_eq!(wallet.kind, WalletKind::Hot);
        assert_eq!(wallet.sorted_currencies(), vec!["eth", "link"]);
    }

    #[test]
    fn test_wallet_kind_roundtrip_names() {
        assert_eq!(WalletKind::Deposit.to_string(), "deposit");
        assert_eq!(WalletKind::Hot.label(), "Hot");
        let kind: WalletKind = serde_json::from_str(r#""eth""#).unwrap();
        assert_eq!(kind, WalletKind::Other);
    }
}
