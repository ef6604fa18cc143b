use std::sync::Arc;

use todo_core::services::{CategoryService, TaskService};
use todo_core::store::Store;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Persistence gateway factory, also probed by the health check.
    pub store: Arc<dyn Store>,
    /// Server configuration (field limits are read by every write handler).
    pub config: Arc<ServerConfig>,
    pub categories: CategoryService,
    pub tasks: TaskService,
}

impl AppState {
    /// Wire both rule engines to `store`.
    pub fn new(store: Arc<dyn Store>, config: ServerConfig) -> Self {
        Self {
            categories: CategoryService::new(Arc::clone(&store)),
            tasks: TaskService::new(Arc::clone(&store)),
            store,
            config: Arc::new(config),
        }
    }
}
