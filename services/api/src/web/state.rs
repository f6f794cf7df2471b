//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use crate::web::protocol::ServerMessage;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tutor_core::{ContentGenerator, ContentPipeline, Shell};

/// Capacity of the event channel feeding WebSocket clients. Slow clients
/// skip ahead rather than block the generation flow.
const EVENT_CHANNEL_CAPACITY: usize = 64;

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: ContentPipeline,
    /// The single shell every client drives. Never held across the outbound call.
    pub shell: Arc<Mutex<Shell>>,
    pub events: broadcast::Sender<ServerMessage>,
}

impl AppState {
    pub fn new(config: Arc<Config>, generator: Arc<dyn ContentGenerator>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            config,
            pipeline: ContentPipeline::new(generator),
            shell: Arc::new(Mutex::new(Shell::new())),
            events,
        }
    }

    /// Pushes an event to every connected WebSocket client. Having no
    /// listeners is normal.
    pub fn publish(&self, message: ServerMessage) {
        let _ = self.events.send(message);
    }
}
