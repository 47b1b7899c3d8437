use std::{sync::Arc, time::Instant};

use crate::{configs::Config, room::RoomRegistry, server::Gateway};

/// Top-level application state.
pub struct AppState {
    pub registry: Arc<RoomRegistry>,
    pub gateway: Arc<Gateway>,
    pub config: Config,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            registry: Arc::new(RoomRegistry::new(&config.room)),
            gateway: Arc::new(Gateway::new()),
            config,
            start_time: Instant::now(),
        }
    }
}
