//! Debounced heartbeat scheduler driven by transport events.
//!
//! Converts transport activity into a single pending heartbeat timer,
//! always measured from the most recent activity. A heartbeat only
//! fires after a full idle window; while it keeps succeeding it
//! reschedules itself, and a failure suspends probing until the
//! transport shows life again.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::status::{ConnectionStatus, StatusCell, StatusSubscription};
use crate::transport::{PingService, TransportEvent};

/// Transport-coupled ONLINE/OFFLINE monitor with debounced pings.
///
/// Open/close/activity events drive immediate status transitions; the
/// heartbeat covers the silent-failure gap in between. Disposal stops
/// the loop and cancels any pending heartbeat; dropping the scheduler
/// disposes it.
pub struct HeartbeatScheduler {
    state: Arc<StatusCell>,
    cancel: CancellationToken,
}

impl HeartbeatScheduler {
    /// Spawn the scheduler task. Must be called within a tokio runtime;
    /// `ping_timeout` must be non-zero.
    pub fn spawn(
        ping: Arc<dyn PingService>,
        events: mpsc::UnboundedReceiver<TransportEvent>,
        ping_timeout: Duration,
    ) -> Self {
        let state = Arc::new(StatusCell::new());
        let cancel = CancellationToken::new();

        let task_state = state.clone();
        let task_cancel = cancel.clone();
        tokio::spawn(run_loop(task_state, task_cancel, ping, events, ping_timeout));

        Self { state, cancel }
    }

    /// Current status; pure read.
    pub fn current_status(&self) -> ConnectionStatus {
        self.state.get()
    }

    /// Subscribe to status transitions.
    pub fn subscribe(&self) -> StatusSubscription {
        self.state.subscribe()
    }

    /// Stop the scheduler and cancel any pending heartbeat. Idempotent.
    pub fn dispose(&self) {
        self.cancel.cancel();
    }
}

impl Drop for HeartbeatScheduler {
    fn drop(&mut self) {
        self.dispose();
    }
}

async fn run_loop(
    state: Arc<StatusCell>,
    cancel: CancellationToken,
    ping: Arc<dyn PingService>,
    mut events: mpsc::UnboundedReceiver<TransportEvent>,
    ping_timeout: Duration,
) {
    // The single pending heartbeat; replaced on every activity (debounce),
    // cleared on open/close/failure.
    let mut deadline: Option<Instant> = None;

    loop {
        tokio::select! {
            // Events outrank the timer: activity arriving before a
            // heartbeat fires always replaces it.
            biased;
            _ = cancel.cancelled() => break,
            event = events.recv() => {
                let Some(event) = event else { break };
                match event {
                    TransportEvent::Opened => {
                        state.set(ConnectionStatus::Online);
                        deadline = None;
                    }
                    TransportEvent::Closed => {
                        state.set(ConnectionStatus::Offline);
                        deadline = None;
                    }
                    TransportEvent::Activity => {
                        state.set(ConnectionStatus::Online);
                        deadline = Some(Instant::now() + ping_timeout);
                    }
                }
            }
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                match ping.ping().await {
                    Ok(()) => {
                        if cancel.is_cancelled() {
                            break;
                        }
                        debug!("heartbeat ping succeeded");
                        state.set(ConnectionStatus::Online);
                        deadline = Some(Instant::now() + ping_timeout);
                    }
                    Err(e) => {
                        if cancel.is_cancelled() {
                            break;
                        }
                        warn!("heartbeat ping failed: {}", e);
                        state.set(ConnectionStatus::Offline);
                        // No point probing a link that just failed a ping;
                        // probing resumes on the next activity or open.
                        deadline = None;
                    }
                }
            }
        }
    }
}
