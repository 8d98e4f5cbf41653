use std::sync::Arc;

use classdash_db::store::RowStore;

use crate::config::ServerConfig;
use crate::engine::{DashboardStore, SessionManager};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// The row store both engines write through.
    pub store: Arc<dyn RowStore>,
    /// Server configuration (identity verification, timeouts).
    pub config: Arc<ServerConfig>,
    /// Per-user named dashboards.
    pub dashboards: Arc<DashboardStore>,
    /// Live session state machine.
    pub sessions: Arc<SessionManager>,
}

impl AppState {
    /// Wire both engines onto one store.
    pub fn new(store: Arc<dyn RowStore>, config: ServerConfig) -> Self {
        Self {
            dashboards: Arc::new(DashboardStore::new(Arc::clone(&store))),
            sessions: Arc::new(SessionManager::new(Arc::clone(&store))),
            store,
            config: Arc::new(config),
        }
    }
}
