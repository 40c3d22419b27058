//! Connection status primitives shared by the monitors.
//!
//! Holds the two-state [`ConnectionStatus`] value, the [`StatusChange`]
//! event emitted on transitions, and the internal status cell that
//! deduplicates updates and fans events out to subscribers.

use std::sync::Mutex;

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::warn;

/// Buffered transitions per subscriber before a slow consumer lags.
const EVENT_BUFFER: usize = 16;

/// Reachability of the logical connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// The connection is believed reachable.
    Online,
    /// The connection is believed dead or unreachable.
    Offline,
}

impl ConnectionStatus {
    /// Map a liveness verdict to a status value.
    pub fn from_alive(alive: bool) -> Self {
        if alive {
            ConnectionStatus::Online
        } else {
            ConnectionStatus::Offline
        }
    }

    pub fn is_online(self) -> bool {
        self == ConnectionStatus::Online
    }
}

/// A single observed status transition.
#[derive(Debug, Clone, Serialize)]
pub struct StatusChange {
    /// Timestamp in milliseconds.
    pub ts: u64,
    /// The status after the transition.
    pub status: ConnectionStatus,
}

/// Subscription to status transitions.
///
/// Dropping the subscription unsubscribes. Events are delivered in
/// transition order; same-value updates never produce an event.
pub struct StatusSubscription {
    rx: broadcast::Receiver<StatusChange>,
}

impl StatusSubscription {
    /// Receive the next transition.
    ///
    /// Returns `None` once the owning monitor has been dropped and no
    /// buffered events remain.
    pub async fn recv(&mut self) -> Option<StatusChange> {
        loop {
            match self.rx.recv().await {
                Ok(change) => return Some(change),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "status subscriber lagged, dropping old transitions");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// Shared status state: current value plus the transition event bus.
///
/// Mutation goes through [`StatusCell::set`], which is an idempotent
/// no-op when the value is unchanged.
pub(crate) struct StatusCell {
    current: Mutex<ConnectionStatus>,
    events: broadcast::Sender<StatusChange>,
}

impl StatusCell {
    /// New cell, optimistically [`ConnectionStatus::Online`].
    pub(crate) fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            current: Mutex::new(ConnectionStatus::Online),
            events,
        }
    }

    pub(crate) fn get(&self) -> ConnectionStatus {
        *self.current.lock().expect("status lock poisoned")
    }

    /// Update the status, emitting a [`StatusChange`] on transitions.
    ///
    /// Returns `true` if the value changed.
    pub(crate) fn set(&self, status: ConnectionStatus) -> bool {
        let mut current = self.current.lock().expect("status lock poisoned");
        if *current == status {
            return false;
        }
        *current = status;
        drop(current);

        // No subscribers is fine; the send result only signals that.
        let _ = self.events.send(StatusChange {
            ts: now_ms(),
            status,
        });
        true
    }

    pub(crate) fn subscribe(&self) -> StatusSubscription {
        StatusSubscription {
            rx: self.events.subscribe(),
        }
    }
}

/// Helper to get current timestamp in milliseconds.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
