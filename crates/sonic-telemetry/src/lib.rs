//! Prometheus metrics and structured logging for sonic.
//!
//! - Structured logging with tracing (JSON in production)
//! - Prometheus metrics for reconciliation ticks, replicated items and
//!   secret cache refreshes

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{init_logging, init_logging_with, LogFormat};
pub use metrics::Metrics;
