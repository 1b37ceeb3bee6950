//! Trading markets.

use crate::serde_helpers::{lenient_decimal, lenient_string};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A trading pair with its price and amount bounds.
///
/// The same shape is used for catalog entries and for markets returned by the
/// management API; only the latter carry `engine_id`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Market {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    pub name: String,
    pub base_unit: String,
    pub quote_unit: String,
    pub state: String,
    pub amount_precision: i64,
    pub price_precision: i64,
    #[serde(deserialize_with = "lenient_decimal")]
    pub min_price: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub max_price: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub min_amount: Decimal,
    pub position: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_id: Option<u64>,
}

impl Market {
    /// Whether replicating `self` over `existing` should count as a bounds change.
    ///
    /// The rule fires when the incoming minimum price OR minimum amount is
    /// greater than or equal to the current one, so equal bounds also fire.
    /// Only a strictly lower pair leaves the market untouched.
    pub fn bounds_trigger_update(&self, existing: &Market) -> bool {
        self.min_price >= existing.min_price || self.min_amount >= existing.min_amount
    }
}
