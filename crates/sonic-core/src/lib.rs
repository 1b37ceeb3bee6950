//! Core catalog types for the sonic platform synchronizer.
//!
//! This crate provides the entities exchanged with the control-plane and the
//! trading-engine management API:
//! - `Currency`, `Network`: assets and their blockchain representations
//! - `Market`: trading pairs with price/amount bounds
//! - `Wallet`: deposit/hot wallets serving a group of currencies
//! - `Catalog`, `CurrencyGroups`: a catalog snapshot and its wallet grouping

pub mod catalog;
pub mod currency;
pub mod error;
pub mod market;
pub mod serde_helpers;
pub mod wallet;

pub use catalog::{Catalog, CurrencyGroups};
pub use currency::{Currency, CurrencyType, Network};
pub use error::{CoreError, Result};
pub use market::Market;
pub use wallet::{Wallet, WalletKind};

use std::future::Future;
use std::pin::Pin;

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Blockchain key assigned to every coin network and wallet replicated from the cloud.
pub const CLOUD_BLOCKCHAIN_KEY: &str = "opendax-cloud";

/// Wallet gateway used for cloud-backed wallets.
pub const CLOUD_GATEWAY: &str = "opendax_cloud";
