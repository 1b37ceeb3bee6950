//! Reconciliation configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Reconciliation daemon configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Run the reconciliation daemons at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Full reconciliation interval in seconds.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Markets-only interval in seconds.
    #[serde(default = "default_markets_interval_secs")]
    pub markets_interval_secs: u64,
    /// Replicate markets only, instead of the full catalog.
    #[serde(default)]
    pub markets_only: bool,
    /// Currency ids never replicated.
    #[serde(default)]
    pub currencies_blacklist: Vec<String>,
    /// Market ids never replicated.
    #[serde(default)]
    pub markets_blacklist: Vec<String>,
}

fn default_enabled() -> bool {
    true
}

fn default_interval_secs() -> u64 {
    300
}

fn default_markets_interval_secs() -> u64 {
    3600
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            interval_secs: default_interval_secs(),
            markets_interval_secs: default_markets_interval_secs(),
            markets_only: false,
            currencies_blacklist: Vec::new(),
            markets_blacklist: Vec::new(),
        }
    }
}

impl SyncConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn markets_interval(&self) -> Duration {
        Duration::from_secs(self.markets_interval_secs)
    }

    pub fn is_market_blacklisted(&self, id: &str) -> bool {
        self.markets_blacklist.iter().any(|m| m == id)
    }

    /// Validate configuration values.
    ///
    /// Both timers need a non-zero period, even when the daemon they drive
    /// is not selected.
    pub fn validate(&self) -> Result<(), String> {
        if self.interval_secs == 0 {
            return Err("sync.interval_secs must be positive".to_string());
        }
        if self.markets_interval_secs == 0 {
            return Err("sync.markets_interval_secs must be positive".to_string());
        }
        Ok(())
    }
}
