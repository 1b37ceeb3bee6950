//! Prometheus metrics.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`. A registration failure means a
//! duplicate metric name, which should crash at startup. These panics only
//! occur during static initialization, never at runtime.

use crate::error::{TelemetryError, TelemetryResult};
use once_cell::sync::Lazy;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Encoder, Histogram,
    IntCounter, IntCounterVec, TextEncoder,
};

/// Reconciliation ticks.
/// Labels: outcome (ok/fetch_failed/skipped)
pub static SYNC_TICKS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "sonic_sync_ticks_total",
        "Total reconciliation ticks",
        &["outcome"]
    )
    .unwrap()
});

/// Replicated catalog items.
/// Labels: kind (currency/network/market/wallet), action (created/updated/failed/skipped)
pub static SYNC_ITEMS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "sonic_sync_items_total",
        "Catalog items processed by reconciliation",
        &["kind", "action"]
    )
    .unwrap()
});

/// Restart signal writes.
/// Labels: outcome (ok/failed)
pub static RESTART_SIGNALS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "sonic_restart_signals_total",
        "Restart signals written to the secret store",
        &["outcome"]
    )
    .unwrap()
});

/// Secret cache refreshes.
/// Labels: outcome (ok/failed)
pub static CACHE_REFRESH_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "sonic_cache_refresh_total",
        "Secret cache refreshes",
        &["outcome"]
    )
    .unwrap()
});

/// Scopes reloaded by cache refreshes.
pub static CACHE_SCOPES_RELOADED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "sonic_cache_scopes_reloaded_total",
        "(app, scope) pairs reloaded into the secret cache"
    )
    .unwrap()
});

/// Cache refresh duration in milliseconds.
pub static CACHE_REFRESH_DURATION_MS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "sonic_cache_refresh_duration_ms",
        "Secret cache refresh duration in milliseconds",
        vec![1.0, 5.0, 10.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 5000.0]
    )
    .unwrap()
});

/// Metrics facade.
pub struct Metrics;

impl Metrics {
    pub fn sync_tick(outcome: &str) {
        SYNC_TICKS_TOTAL.with_label_values(&[outcome]).inc();
    }

    /// Record one processed catalog item.
    pub fn sync_item(kind: &str, action: &str) {
        SYNC_ITEMS_TOTAL.with_label_values(&[kind, action]).inc();
    }

    pub fn restart_signal(outcome: &str) {
        RESTART_SIGNALS_TOTAL.with_label_values(&[outcome]).inc();
    }

    /// Record a cache refresh and how many scopes it reloaded.
    pub fn cache_refresh(outcome: &str, scopes_reloaded: usize, duration_ms: f64) {
        CACHE_REFRESH_TOTAL.with_label_values(&[outcome]).inc();
        CACHE_SCOPES_RELOADED_TOTAL.inc_by(scopes_reloaded as u64);
        CACHE_REFRESH_DURATION_MS.observe(duration_ms);
    }

    /// Render the default registry in text exposition format.
    pub fn render() -> TelemetryResult<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder
            .encode(&prometheus::gather(), &mut buffer)
            .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::Metrics(e.to_string()))
    }
}
