//! Wallet matching.
//!
//! An existing wallet fully matches a group when both hold the same currency
//! set, and partially matches when the sets intersect. A group no wallet
//! intersects needs a fresh deposit/hot pair.

use sonic_core::{Wallet, WalletKind, CLOUD_BLOCKCHAIN_KEY, CLOUD_GATEWAY};
use sonic_peatio::{CreateWalletParams, WalletSettings};

/// Path of the cloud wallet gateway, relative to the control-plane address.
pub const WALLET_GATEWAY_PATH: &str = "/api/v2/opx/peatio";

/// Existing wallets classified against one currency group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WalletMatches {
    pub full: Vec<Wallet>,
    pub partial: Vec<Wallet>,
}

impl WalletMatches {
    /// No wallet holds any currency of the group.
    pub fn is_none(&self) -> bool {
        self.full.is_empty() && self.partial.is_empty()
    }
}

/// Classify `wallets` against `group`; currency order is ignored.
pub fn find_currencies_in_wallets(wallets: &[Wallet], group: &[String]) -> WalletMatches {
    let mut wanted = group.to_vec();
    wanted.sort();

    let mut matches = WalletMatches::default();
    for wallet in wallets {
        let held = wallet.sorted_currencies();
        if held == wanted {
            matches.full.push(wallet.clone());
        } else if held.iter().any(|c| wanted.binary_search(c).is_ok()) {
            matches.partial.push(wallet.clone());
        }
    }
    matches
}

/// Union of `existing` and `group`, or `None` when `group` adds nothing.
///
/// Keeps existing currencies first, then the new ones in group order.
pub fn merge_currencies(existing: &[String], group: &[String]) -> Option<Vec<String>> {
    if group.iter().all(|c| existing.contains(c)) {
        return None;
    }

    let mut merged: Vec<String> = Vec::with_capacity(existing.len() + group.len());
    for code in existing.iter().chain(group) {
        if !merged.contains(code) {
            merged.push(code.clone());
        }
    }
    Some(merged)
}

/// Creation parameters for the deposit and hot wallet of one group.
#[derive(Debug, Clone, PartialEq)]
pub struct WalletPair {
    pub deposit: CreateWalletParams,
    pub hot: CreateWalletParams,
}

/// Build the wallet pair for `group`, named after its first currency.
///
/// Returns `None` for an empty group.
pub fn wallet_pair(group: &[String], opendax_addr: &str) -> Option<WalletPair> {
    let code = group.first()?.to_uppercase();

    let shared = |kind: WalletKind| CreateWalletParams {
        name: format!("{code} {} Wallet", kind.label()),
        kind,
        blockchain_key: CLOUD_BLOCKCHAIN_KEY.to_string(),
        gateway: CLOUD_GATEWAY.to_string(),
        address: "address".to_string(),
        currencies: group.to_vec(),
        status: "active".to_string(),
        settings: WalletSettings {
            uri: format!("{}{}", opendax_addr.trim_end_matches('/'), WALLET_GATEWAY_PATH),
        },
    };

    Some(WalletPair {
        deposit: shared(WalletKind::Deposit),
        hot: shared(WalletKind::Hot),
    })
}
