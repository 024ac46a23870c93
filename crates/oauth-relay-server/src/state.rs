//! Application state shared across handlers.

use std::sync::Arc;

use oauth_relay_exchange::Relay;

use crate::config::ServerConfig;

/// Application state shared across all handlers. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    /// The token exchange relay.
    pub relay: Arc<Relay>,

    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(relay: Relay, config: ServerConfig) -> Self {
        Self {
            relay: Arc::new(relay),
            config: Arc::new(config),
        }
    }
}
