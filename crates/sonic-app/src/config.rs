//! Application configuration.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use sonic_cache::CacheConfig;
use sonic_server::ServerConfig;
use sonic_sync::SyncConfig;
use std::path::Path;
use std::time::Duration;

/// Env var naming the configuration file.
pub const CONFIG_ENV: &str = "SONIC_CONFIG";

/// Env var supplying the vault token when the file leaves it empty.
pub const VAULT_TOKEN_ENV: &str = "VAULT_TOKEN";

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Main application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub opendax: OpendaxConfig,
    #[serde(default)]
    pub mngapi: MngApiConfig,
    #[serde(default)]
    pub vault: VaultConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Control-plane catalog endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpendaxConfig {
    #[serde(default = "default_opendax_addr")]
    pub addr: String,
    #[serde(default = "default_http_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_opendax_addr() -> String {
    "https://cloud.opendax.app".to_string()
}

fn default_http_timeout_secs() -> u64 {
    30
}

impl Default for OpendaxConfig {
    fn default() -> Self {
        Self {
            addr: default_opendax_addr(),
            request_timeout_secs: default_http_timeout_secs(),
        }
    }
}

impl OpendaxConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Trading engine management API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MngApiConfig {
    #[serde(default = "default_peatio_url")]
    pub peatio_url: String,
    /// Bearer token for the management API.
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_http_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_peatio_url() -> String {
    "http://peatio:8000/api/v2/peatio/management".to_string()
}

impl Default for MngApiConfig {
    fn default() -> Self {
        Self {
            peatio_url: default_peatio_url(),
            token: String::new(),
            request_timeout_secs: default_http_timeout_secs(),
        }
    }
}

impl MngApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Secret store connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultConfig {
    #[serde(default = "default_vault_addr")]
    pub addr: String,
    #[serde(default)]
    pub token: String,
    /// Prefix under which every application's secrets live.
    #[serde(default = "default_deployment_id")]
    pub deployment_id: String,
    #[serde(default = "default_vault_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_vault_addr() -> String {
    "http://vault:8200".to_string()
}

fn default_deployment_id() -> String {
    "opendax".to_string()
}

fn default_vault_timeout_secs() -> u64 {
    10
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            addr: default_vault_addr(),
            token: String::new(),
            deployment_id: default_deployment_id(),
            request_timeout_secs: default_vault_timeout_secs(),
        }
    }
}

impl VaultConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl AppConfig {
    /// Load from the default path, falling back to defaults when it is missing.
    pub fn load() -> AppResult<Self> {
        if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::from_file(DEFAULT_CONFIG_PATH)
        } else {
            tracing::warn!(path = DEFAULT_CONFIG_PATH, "Config file not found, using defaults");
            Ok(Self::default().with_vault_token(std::env::var(VAULT_TOKEN_ENV).ok()))
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        Ok(Self::parse(&content)?.with_vault_token(std::env::var(VAULT_TOKEN_ENV).ok()))
    }

    /// Parse and validate TOML content.
    pub fn parse(content: &str) -> AppResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.validate().map_err(AppError::Config)?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Returns Err if any timer period or request timeout is zero.
    pub fn validate(&self) -> Result<(), String> {
        self.sync.validate()?;
        self.cache.validate()?;

        let timeouts = [
            ("opendax", self.opendax.request_timeout_secs),
            ("mngapi", self.mngapi.request_timeout_secs),
            ("vault", self.vault.request_timeout_secs),
        ];
        if let Some((section, _)) = timeouts.iter().find(|(_, secs)| *secs == 0) {
            return Err(format!("{section}.request_timeout_secs must be positive"));
        }
        Ok(())
    }

    /// Fill an empty vault token from the environment.
    pub fn with_vault_token(mut self, env_token: Option<String>) -> Self {
        if self.vault.token.is_empty() {
            if let Some(token) = env_token.filter(|t| !t.is_empty()) {
                self.vault.token = token;
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sonic_vault::Scope;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.opendax.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.mngapi.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.vault.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.sync.interval_secs, 300);
        assert_eq!(config.sync.markets_interval_secs, 3600);
        assert_eq!(config.cache.scope, Scope::Public);
        assert_eq!(config.server.port, 6009);
    }

    #[test]
    fn test_parse_sections() {
        let content = r#"
[opendax]
addr = "http://opendax:3000"

[mngapi]
peatio_url = "http://peatio:8000/api/v2/peatio/management"
token = "mng-token"

[vault]
addr = "http://127.0.0.1:8200"
deployment_id = "odax-dev"

[sync]
interval_secs = 60
markets_only = true
markets_blacklist = ["trstusdt"]

[cache]
scope = "private"
refresh_interval_secs = 5

[server]
port = 8080
username = "admin"
password = "changeme"
"#;
        let config = AppConfig::parse(content).unwrap();
        assert_eq!(config.opendax.addr, "http://opendax:3000");
        assert_eq!(config.opendax.request_timeout_secs, 30);
        assert_eq!(config.mngapi.token, "mng-token");
        assert_eq!(config.vault.deployment_id, "odax-dev");
        assert!(config.sync.markets_only);
        assert!(config.sync.is_market_blacklisted("trstusdt"));
        assert_eq!(config.cache.scope, Scope::Private);
        assert_eq!(config.cache.refresh_interval_secs, 5);
        assert!(config.server.auth_enabled());
    }

    #[test]
    fn test_parse_error() {
        let err = AppConfig::parse("[sync]\ninterval_secs = \"often\"").unwrap_err();
        assert!(err.to_string().starts_with("Configuration error: Failed to parse config"));
    }

    #[test]
    fn test_zero_intervals_rejected() {
        for (content, field) in [
            ("[sync]\ninterval_secs = 0", "sync.interval_secs"),
            ("[sync]\nmarkets_interval_secs = 0", "sync.markets_interval_secs"),
            ("[cache]\nrefresh_interval_secs = 0", "cache.refresh_interval_secs"),
            ("[vault]\nrequest_timeout_secs = 0", "vault.request_timeout_secs"),
        ] {
            let err = AppConfig::parse(content).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("Configuration error: {field} must be positive")
            );
        }
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_vault_token_from_env() {
        let config = AppConfig::default().with_vault_token(Some("s.env".to_string()));
        assert_eq!(config.vault.token, "s.env");

        let mut explicit = AppConfig::default();
        explicit.vault.token = "s.file".to_string();
        let config = explicit.with_vault_token(Some("s.env".to_string()));
        assert_eq!(config.vault.token, "s.file");

        let config = AppConfig::default().with_vault_token(Some(String::new()));
        assert!(config.vault.token.is_empty());
    }

    #[test]
    fn test_shipped_default_file_parses() {
        let content = include_str!("../../../config/default.toml");
        let config = AppConfig::parse(content).unwrap();
        assert!(config.sync.enabled);
        assert_eq!(config.server.port, 6009);
    }
}
