use std::sync::Arc;

use calcmark_db::LocalStore;
use calcmark_sync::{RecoveryReport, Replicator};

use crate::config::ServerConfig;

/// Shared application state, cloned per request.
#[derive(Clone)]
pub struct AppState {
    /// Write path: local commit plus background remote replication.
    pub replicator: Replicator,
    pub config: Arc<ServerConfig>,
    /// What startup recovery decided, surfaced on the admin status route.
    pub recovery: Arc<RecoveryReport>,
}

impl AppState {
    /// Read path shortcut.
    pub fn store(&self) -> &LocalStore {
        self.replicator.store()
    }
}
