//! Shared application state for the HTTP server.
//!
//! The orchestrator sits behind an async `RwLock`: read endpoints take
//! the read side and never block each other; `POST /advance` takes the
//! write side, which is the driver's write critical section. Events
//! appended by an advance are fanned out to SSE subscribers through a
//! broadcast channel.

use std::sync::Arc;

use pitchside_core::Orchestrator;
use pitchside_types::Event;
use serde::Serialize;
use tokio::sync::{broadcast, RwLock};

/// Capacity of the broadcast channel feeding SSE subscribers. A
/// subscriber that falls more than this far behind skips ahead.
const BROADCAST_CAPACITY: usize = 1024;

/// One appended event as pushed to stream subscribers.
#[derive(Debug, Clone, Serialize)]
pub struct StreamedEvent {
    /// The log sequence of the event.
    pub sequence: u64,
    /// The event itself.
    #[serde(flatten)]
    pub event: Event,
}

/// Shared state injected into every handler.
pub struct AppState {
    /// The single write path, behind a reader-writer lock.
    pub orchestrator: RwLock<Orchestrator>,
    /// Fan-out for newly appended events.
    pub events_tx: broadcast::Sender<StreamedEvent>,
}

impl AppState {
    /// Wrap an orchestrator for serving.
    pub fn new(orchestrator: Orchestrator) -> Arc<Self> {
        let (events_tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Arc::new(Self {
            orchestrator: RwLock::new(orchestrator),
            events_tx,
        })
    }

    /// Subscribe to live appended events.
    pub fn subscribe(&self) -> broadcast::Receiver<StreamedEvent> {
        self.events_tx.subscribe()
    }

    /// Publish appended events to all subscribers. Zero receivers is
    /// normal (nobody streaming) and not an error.
    pub fn broadcast(&self, events: impl IntoIterator<Item = StreamedEvent>) {
        for event in events {
            let _ = self.events_tx.send(event);
        }
    }
}
