//! Best-effort event fan-out to live subscribers.

use tokio::sync::broadcast;
use tracing::debug;

use vidova_models::VideoEvent;

/// Broadcast channel for `video_processed` events.
///
/// Delivery is best-effort: subscribers connected before the event
/// fires receive it, others catch up through the listing endpoint.
/// Nothing is persisted or replayed.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<VideoEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event to all current subscribers; returns how many
    /// received it. Zero subscribers is not an error.
    pub fn publish(&self, event: VideoEvent) -> usize {
        match self.tx.send(event) {
            Ok(n) => n,
            Err(_) => {
                debug!("No live subscribers for event");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<VideoEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(128)
    }
}
