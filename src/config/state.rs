// Application state module
// Shared, read-mostly state handed to every connection

use std::sync::atomic::AtomicBool;

use super::types::Config;
use crate::agent::Router;

/// Application state
pub struct AppState {
    pub config: Config,
    pub router: Router,

    // Cached config values for fast access without locks
    pub cached_access_log: AtomicBool,
}

impl AppState {
    pub fn new(config: &Config, router: Router) -> Self {
        Self {
            config: config.clone(),
            router,
            cached_access_log: AtomicBool::new(config.logging.access_log),
        }
    }
}
