//! Feed event broadcaster
//!
//! Fan-out channel from the server to every connected SSE client, built on
//! `tokio::sync::broadcast`. Delivery is at-most-once per connected client:
//! no acknowledgment, no retry, no replay of events missed while
//! disconnected.

use tokio::sync::broadcast;
use tracing::{debug, info};

use riskmap_common::events::FeedEvent;

/// Broadcaster manages client subscriptions and event distribution.
#[derive(Clone)]
pub struct Broadcaster {
    tx: broadcast::Sender<FeedEvent>,
}

impl Broadcaster {
    /// Create a new broadcaster buffering up to `capacity` events per
    /// lagging subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        info!("feed broadcaster initialized with capacity {capacity}");
        Self { tx }
    }

    /// Broadcast an event to all connected clients, ignoring whether any
    /// are listening. Fire-and-forget: slow or gone receivers never block
    /// the sender.
    pub fn broadcast_lossy(&self, event: FeedEvent) {
        match self.tx.send(event) {
            Ok(count) => debug!("broadcast event to {count} clients"),
            Err(_) => debug!("broadcast event with no clients connected"),
        }
    }

    /// Current number of connected clients.
    pub fn client_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Subscribe a new client to the live feed.
    pub fn subscribe(&self) -> broadcast::Receiver<FeedEvent> {
        self.tx.subscribe()
    }
}
