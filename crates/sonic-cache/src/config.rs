//! Cache configuration.

use serde::{Deserialize, Serialize};
use sonic_vault::Scope;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Scope mirrored by the cache.
    #[serde(default = "default_scope")]
    pub scope: Scope,
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

fn default_scope() -> Scope {
    Scope::Public
}

fn default_refresh_interval_secs() -> u64 {
    30
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            scope: default_scope(),
            refresh_interval_secs: default_refresh_interval_secs(),
        }
    }
}

impl CacheConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.refresh_interval_secs == 0 {
            return Err("cache.refresh_interval_secs must be positive".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: CacheConfig = toml::from_str("").unwrap();
        assert_eq!(config.scope, Scope::Public);
        assert_eq!(config.refresh_interval(), Duration::from_secs(30));

        let config: CacheConfig = toml::from_str(r#"scope = "private""#).unwrap();
        assert_eq!(config.scope, Scope::Private);
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        assert!(CacheConfig::default().validate().is_ok());

        let config: CacheConfig = toml::from_str("refresh_interval_secs = 0").unwrap();
        assert!(config.validate().is_err());
    }
}
