//! Best-effort broadcast of agent events

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;
use super::MonotonicClock;
use crate::types::{AgentEvent, EventEnvelope};

pub const EVENT_CHANNEL_CAPACITY: usize = 256;

struct Inner {
    sender: broadcast::Sender<EventEnvelope>,
    sequence: AtomicU64,
    clock: MonotonicClock,
}

/// Cheap to clone; all clones publish on the same channel and share the
/// sequence counter. Slow subscribers lose old events rather than block
/// the pipeline.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<Inner>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            inner: Arc::new(Inner {
                sender,
                sequence: AtomicU64::new(0),
                clock: MonotonicClock::new(),
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.inner.sender.subscribe()
    }

    pub fn publish(&self, event: AgentEvent) -> EventEnvelope {
        let envelope = EventEnvelope {
            sequence: self.inner.sequence.fetch_add(1, Ordering::SeqCst) + 1,
            timestamp_ms: self.inner.clock.now_ms(),
            event,
        };
        if self.inner.sender.send(envelope.clone()).is_err() {
            debug!(event = envelope.event.name(), "No event subscribers");
        }
        envelope
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(EVENT_CHANNEL_CAPACITY)
    }
}
