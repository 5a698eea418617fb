//! Application state shared across routes

use std::sync::Arc;

use crate::config::Config;
use crate::game::ArenaHandle;
use crate::ws::registry::ConnectionRegistry;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub arena: ArenaHandle,
    pub registry: Arc<ConnectionRegistry>,
}

impl AppState {
    pub fn new(config: Config, arena: ArenaHandle, registry: Arc<ConnectionRegistry>) -> Self {
        Self {
            config: Arc::new(config),
            arena,
            registry,
        }
    }
}
