// Application state module
// Immutable state shared by every connection task

use std::sync::Arc;

use super::types::Config;
use crate::registry::RouteRegistry;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Route table, frozen before the first connection is accepted
    pub registry: Arc<RouteRegistry>,
}

impl AppState {
    pub fn new(config: &Config, registry: Arc<RouteRegistry>) -> Self {
        Self {
            config: config.clone(),
            registry,
        }
    }
}
