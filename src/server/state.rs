use std::sync::Arc;
use std::time::Instant;

use crate::config::Settings;
use crate::connection_manager::ConnectionRegistry;
use crate::hub::SignalingHub;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub connection_registry: Arc<ConnectionRegistry>,
    pub hub: Arc<SignalingHub>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let connection_registry = Arc::new(ConnectionRegistry::new());
        let hub = Arc::new(SignalingHub::new(
            connection_registry.clone(),
            settings.matchmaking.clone(),
        ));

        Self {
            settings: Arc::new(settings),
            connection_registry,
            hub,
            start_time: Instant::now(),
        }
    }
}
