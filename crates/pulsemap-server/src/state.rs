//! Shared application state

use crate::config::ServerConfig;
use crate::metrics::MetricsCollector;
use crate::queue::BroadcastQueue;
use std::sync::Arc;

/// State shared by every handler.
///
/// Constructed once at startup and torn down at shutdown; the broadcast
/// queue lives here rather than in any global.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Backlog plus observer registry
    pub queue: Arc<BroadcastQueue>,

    /// Ingestion counters for the stats endpoint
    pub metrics: Arc<MetricsCollector>,
}

impl AppState {
    /// Build state from configuration
    pub fn new(config: ServerConfig) -> Self {
        let queue = Arc::new(BroadcastQueue::new(config.max_backlog));
        Self {
            config: Arc::new(config),
            queue,
            metrics: Arc::new(MetricsCollector::new()),
        }
    }
}
