//! Catalog reconciliation.
//!
//! Replicates the control-plane catalog into the trading engine:
//! - [`grouping`]: currencies -> wallet groups
//! - [`wallets`]: classify existing wallets against a group
//! - [`ReconciliationDaemon`]: currencies, networks, markets and wallets on a timer
//! - [`MarketsDaemon`]: markets-only replication on a slower timer
//! - [`restart`]: restart signal for the matching engine

pub mod config;
pub mod daemon;
pub mod error;
pub mod grouping;
pub mod markets;
pub mod restart;
pub mod settings;
pub mod wallets;

pub use config::SyncConfig;
pub use daemon::{ReconciliationDaemon, SyncTrigger, TickReport};
pub use error::{SyncError, SyncResult};
pub use grouping::divide_into_groups;
pub use markets::MarketsDaemon;
pub use restart::{read_restart_signal, set_restart_signal, spawn_restart_signal};
pub use wallets::{find_currencies_in_wallets, merge_currencies, wallet_pair, WalletMatches, WalletPair};
