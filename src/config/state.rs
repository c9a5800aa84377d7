// Application state module
// Immutable configuration plus the upstream client shared by every connection

use std::sync::Arc;

use super::types::Config;
use crate::relay::Fetcher;

/// Application state
pub struct AppState {
    pub config: Config,
    pub fetcher: Arc<dyn Fetcher>,
}

impl AppState {
    pub fn new(config: Config, fetcher: Arc<dyn Fetcher>) -> Self {
        Self { config, fetcher }
    }

    /// Whether per-request access log lines are written
    pub const fn access_log(&self) -> bool {
        self.config.logging.access_log
    }
}
