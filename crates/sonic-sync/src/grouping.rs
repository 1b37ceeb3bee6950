//! Wallet grouping.
//!
//! Currencies whose networks hang off the same anchor network share one
//! deposit wallet and one hot wallet. The group key is the anchor's currency
//! id: a network with an empty `parent_id` anchors its own group, any other
//! network joins the group named by its `parent_id`.

use sonic_core::{Currency, CurrencyGroups};
use tracing::warn;

/// Group currencies for wallet sharing.
///
/// Only the first network of each currency is inspected; fiat networks
/// (empty blockchain key) are dropped. Anchors are placed before children
/// so every group lists its anchor first. A child whose anchor is missing
/// still gets a group under its parent id.
pub fn divide_into_groups(currencies: &[Currency]) -> CurrencyGroups {
    let mut networks = Vec::with_capacity(currencies.len());
    for currency in currencies {
        if let Err(e) = currency.check_uniform_parent() {
            warn!(currency = %currency.id, error = %e, "Grouping by first network only");
        }
        if let Some(network) = currency.grouping_network() {
            networks.push(network);
        }
    }

    // Stable: "" sorts first, ties keep catalog order.
    networks.sort_by(|a, b| a.parent_id.cmp(&b.parent_id));

    let mut groups = CurrencyGroups::new();
    for network in networks.into_iter().filter(|n| !n.is_fiat()) {
        let key = if network.is_group_anchor() {
            &network.currency_id
        } else {
            &network.parent_id
        };
        groups
            .entry(key.clone())
            .or_default()
            .push(network.currency_id.clone());
    }
    groups
}
