//! Trading-engine management API client.
//!
//! The management API exposes lookup, create and update operations for
//! currencies, blockchain currencies (networks), markets and wallets. Every
//! call yields either the resource or a structured [`ApiError`].
//!
//! - [`ManagementApi`]: dyn-compatible trait consumed by the daemons
//! - [`PeatioClient`]: reqwest implementation
//! - [`MockManagementApi`]: in-memory implementation recording every call

pub mod api;
pub mod client;
pub mod error;
pub mod mock;
pub mod params;

pub use api::ManagementApi;
pub use client::PeatioClient;
pub use error::{ApiError, ApiResult};
pub use mock::{ApiCall, MockManagementApi};
pub use params::{
    CreateBlockchainCurrencyParams, CreateCurrencyParams, CreateMarketParams, CreateWalletParams,
    UpdateMarketParams, UpdateWalletParams, WalletSettings,
};
