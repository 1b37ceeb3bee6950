//! Control-plane catalog client.
//!
//! Fetches the authoritative currency/network/market catalog from the
//! opendax control-plane. Shared by the reconciliation and markets daemons.

pub mod client;
pub mod error;

pub use client::{CatalogClient, CatalogSource, CONFIG_PATH, MARKETS_PATH, PLATFORM_ID_HEADER};
pub use error::{CatalogError, CatalogResult};
