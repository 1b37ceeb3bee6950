//! sonic - catalog synchronizer and secret cache.
//!
//! Wires the components into one process:
//! - Secret cache warmed at startup, then refreshed on a timer
//! - Reconciliation daemon (or the markets-only daemon)
//! - HTTP server for the public config snapshot and the sync trigger

pub mod app;
pub mod config;
pub mod error;

pub use app::Application;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
