//! Server configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Basic auth username for admin routes (empty = admin routes disabled).
    #[serde(default)]
    pub username: String,
    /// Basic auth password for admin routes (empty = admin routes disabled).
    #[serde(default)]
    pub password: String,
}

fn default_port() -> u16 {
    6009
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            username: String::new(),
            password: String::new(),
        }
    }
}

impl ServerConfig {
    /// Check if basic auth is configured.
    pub fn auth_enabled(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}
