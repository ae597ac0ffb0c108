//! Server configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default SSE keep-alive interval
pub const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(30);

/// Default backlog bound; `0` means unbounded
pub const DEFAULT_MAX_BACKLOG: usize = 10_000;

/// Runtime configuration for the event server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Keep-alive comment interval for idle SSE connections, in seconds
    pub keep_alive_secs: u64,

    /// Maximum number of events retained for replay (`0` = unbounded)
    pub max_backlog: usize,
}

impl ServerConfig {
    /// Keep-alive interval as a [`Duration`]
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            keep_alive_secs: DEFAULT_KEEP_ALIVE.as_secs(),
            max_backlog: DEFAULT_MAX_BACKLOG,
        }
    }
}
