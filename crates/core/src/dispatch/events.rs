//! Result event fan-out with a liveness heartbeat.
//!
//! The bus is a liveness aid, not a source of truth: there is no backlog,
//! and a subscriber that falls behind skips entries. The run record holds
//! the authoritative results.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::warn;

use crate::run::ResultEntry;

/// What a subscriber receives.
#[derive(Debug, Clone)]
pub enum DispatchEvent {
    /// A send finished (successfully or not).
    Result(ResultEntry),
    /// Nothing happened within the heartbeat interval; the stream is alive.
    Heartbeat { timestamp: DateTime<Utc> },
}

/// Broadcast channel of result entries.
///
/// Cheaply cloneable; `emit` is used only by the dispatch worker.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ResultEntry>,
    heartbeat: Duration,
}

impl EventBus {
    pub fn new(capacity: usize, heartbeat: Duration) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, heartbeat }
    }

    /// Publish an entry to all current subscribers.
    pub fn emit(&self, entry: ResultEntry) {
        // Send errors just mean no one is listening
        let _ = self.tx.send(entry);
    }

    /// Subscribe; the subscriber sees every entry emitted after this call.
    pub fn subscribe(&self) -> EventSubscription {
        EventSubscription {
            rx: self.tx.subscribe(),
            heartbeat: self.heartbeat,
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256, Duration::from_secs(1))
    }
}

/// One observer's view of the event stream.
pub struct EventSubscription {
    rx: broadcast::Receiver<ResultEntry>,
    heartbeat: Duration,
}

impl EventSubscription {
    /// Next entry, or a heartbeat if nothing arrives within the interval.
    pub async fn next(&mut self) -> DispatchEvent {
        loop {
            match tokio::time::timeout(self.heartbeat, self.rx.recv()).await {
                Ok(Ok(entry)) => return DispatchEvent::Result(entry),
                Ok(Err(broadcast::error::RecvError::Lagged(skipped))) => {
                    warn!("event subscriber lagged, skipped {skipped} entries");
                }
                // The sender lives as long as the dispatcher; a closed
                // channel only happens in teardown. Keep heartbeat pacing
                // there too, so observers never see a hot loop.
                Ok(Err(broadcast::error::RecvError::Closed)) => {
                    tokio::time::sleep(self.heartbeat).await;
                    return DispatchEvent::Heartbeat {
                        timestamp: Utc::now(),
                    };
                }
                Err(_) => {
                    return DispatchEvent::Heartbeat {
                        timestamp: Utc::now(),
                    };
                }
            }
        }
    }
}
