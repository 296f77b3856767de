//! Event journal fed from the event bus

use anyhow::Result;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{error, warn};
use super::JournalStore;
use crate::types::EventEnvelope;

impl JournalStore {
    pub fn save_event(&self, envelope: &EventEnvelope) -> Result<()> {
        self.append("events", "events", envelope)?;
        Ok(())
    }
}

/// Writes every event published on the bus until the bus is dropped.
pub fn spawn_event_journal(
    store: JournalStore,
    mut events: broadcast::Receiver<EventEnvelope>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(envelope) => {
                    if let Err(e) = store.save_event(&envelope) {
                        error!("Failed to save event {}: {}", envelope.sequence, e);
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    warn!("Event journal lagged, {} events not recorded", missed);
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
