use gestura_core::config::AppConfig;
use gestura_core::GestureHub;
use std::sync::Arc;

/// Shared application state for the server.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub hub: Arc<GestureHub>,
}

impl AppState {
    pub fn new(config: AppConfig, hub: Arc<GestureHub>) -> Self {
        Self { config, hub }
    }
}
