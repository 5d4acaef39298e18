use std::sync::atomic::{AtomicU64, Ordering};

use crate::{config::Config, gateway::Gateway, rooms::ConnectionId, store::MemoryStore};

pub struct AppState {
    pub config: Config,
    pub gateway: Gateway<MemoryStore>,
    connection_counter: AtomicU64,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let gateway = Gateway::new(MemoryStore::new(), config.auction_duration());
        Self {
            config,
            gateway,
            connection_counter: AtomicU64::new(0),
        }
    }

    pub fn next_connection_id(&self) -> ConnectionId {
        self.connection_counter.fetch_add(1, Ordering::Relaxed)
    }

    #[cfg(test)]
    pub fn test() -> Self {
        Self::new(Config {
            frontend_url: "http://auction.test".to_string(),
            outbound_buffer: 16,
            ..Config::default()
        })
    }
}
