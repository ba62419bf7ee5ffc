//! Application state shared across all route handlers.

use std::sync::Arc;
use std::time::Instant;

use monitor_chat::ActivityService;
use monitor_core::config::MonitorConfig;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<MonitorConfig>,
    /// Query pipeline.
    pub service: Arc<ActivityService>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: MonitorConfig, service: ActivityService) -> Self {
        Self {
            config: Arc::new(config),
            service: Arc::new(service),
            start_time: Instant::now(),
        }
    }
}
