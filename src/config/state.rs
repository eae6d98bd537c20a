// Application state module
// Shared, read-mostly state handed to every connection

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::sync::Notify;

use super::types::Config;

/// Application state
pub struct AppState {
    pub config: Config,

    /// Connections currently being served
    pub active_connections: Arc<AtomicUsize>,

    /// Notified once when the server should stop accepting
    pub shutdown: Arc<Notify>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            active_connections: Arc::new(AtomicUsize::new(0)),
            shutdown: Arc::new(Notify::new()),
        }
    }
}
