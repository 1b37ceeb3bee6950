//! Catalog snapshots published by the control-plane.

use crate::error::{CoreError, Result};
use crate::{Currency, Market};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Wallet groups: anchor currency code -> currency codes sharing one wallet pair.
///
/// Codes inside a group keep insertion order (anchor first).
pub type CurrencyGroups = BTreeMap<String, Vec<String>>;

/// Body of `GET /api/v2/opx/config`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub currencies: Vec<Currency>,
    pub markets: Vec<Market>,
}

impl Catalog {
    pub fn is_empty(&self) -> bool {
        self.currencies.is_empty() && self.markets.is_empty()
    }

    /// Check that currency and market ids are unique within the snapshot.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for currency in &self.currencies {
            if !seen.insert(currency.id.as_str()) {
                return Err(CoreError::InvalidCatalog(format!(
                    "duplicate currency id {}",
                    currency.id
                )));
            }
        }

        let mut seen = HashSet::new();
        for market in &self.markets {
            if !seen.insert(market.id.as_str()) {
                return Err(CoreError::InvalidCatalog(format!(
                    "duplicate market id {}",
                    market.id
                )));
            }
        }
        Ok(())
    }

    /// Drop blacklisted currencies and markets.
    pub fn without(&self, currencies: &[String], markets: &[String]) -> Catalog {
        Catalog {
            currencies: self
                .currencies
                .iter()
                .filter(|c| !currencies.contains(&c.id))
                .cloned()
                .collect(),
            markets: self
                .markets
                .iter()
                .filter(|m| !markets.contains(&m.id))
                .cloned()
                .collect(),
        }
    }
}
