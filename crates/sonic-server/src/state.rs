//! Shared handler state.

use crate::config::ServerConfig;
use sonic_cache::VersionedCache;
use sonic_sync::SyncTrigger;
use std::sync::Arc;

/// State shared by all handlers.
#[derive(Clone)]
pub struct ServerState {
    pub(crate) cache: Arc<VersionedCache>,
    /// Absent when reconciliation is not running in this process.
    pub(crate) trigger: Option<Arc<dyn SyncTrigger>>,
    pub(crate) config: ServerConfig,
}

impl ServerState {
    pub fn new(
        cache: Arc<VersionedCache>,
        trigger: Option<Arc<dyn SyncTrigger>>,
        config: ServerConfig,
    ) -> Self {
        Self {
            cache,
            trigger,
            config,
        }
    }
}
