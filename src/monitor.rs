//! Generic polling status monitor.
//!
//! Evaluates an abstract liveness predicate at a fixed cadence and
//! publishes [`ConnectionStatus`] transitions. Usable against any
//! liveness source; the transport-coupled variant lives in
//! [`crate::connection`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::status::{ConnectionStatus, StatusCell, StatusSubscription};

/// Abstract liveness predicate polled by [`StatusMonitor`].
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    /// Whether the connection is currently alive.
    ///
    /// An `Err` is treated as "not alive" for that tick and is never
    /// propagated to the monitor's callers.
    async fn is_alive(&self) -> Result<bool>;
}

/// Liveness probe backed by a shared boolean flag.
///
/// For embedding hosts that already track liveness themselves and only
/// need to expose it to a monitor.
#[derive(Debug, Clone, Default)]
pub struct SharedAliveFlag {
    alive: Arc<AtomicBool>,
}

impl SharedAliveFlag {
    pub fn new(alive: bool) -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(alive)),
        }
    }

    pub fn set_alive(&self, alive: bool) {
        self.alive.store(alive, Ordering::Release);
    }
}

#[async_trait]
impl LivenessProbe for SharedAliveFlag {
    async fn is_alive(&self) -> Result<bool> {
        Ok(self.alive.load(Ordering::Acquire))
    }
}

/// Periodic ONLINE/OFFLINE monitor over a [`LivenessProbe`].
///
/// Starts optimistically online; the first check runs one full
/// `check_interval` after spawn. Disposal stops the polling task and
/// is idempotent; dropping the monitor disposes it.
pub struct StatusMonitor {
    state: Arc<StatusCell>,
    cancel: CancellationToken,
}

impl StatusMonitor {
    /// Spawn the polling task. Must be called within a tokio runtime;
    /// `check_interval` must be non-zero.
    pub fn spawn(probe: Arc<dyn LivenessProbe>, check_interval: Duration) -> Self {
        let state = Arc::new(StatusCell::new());
        let cancel = CancellationToken::new();

        let task_state = state.clone();
        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            let mut ticker =
                time::interval_at(Instant::now() + check_interval, check_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    _ = task_cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let alive = match probe.is_alive().await {
                            Ok(alive) => alive,
                            Err(e) => {
                                debug!("liveness probe failed: {}", e);
                                false
                            }
                        };
                        // The probe may have resolved after disposal.
                        if task_cancel.is_cancelled() {
                            break;
                        }
                        let status = ConnectionStatus::from_alive(alive);
                        if task_state.set(status) {
                            debug!(?status, "connection status changed");
                        }
                    }
                }
            }
        });

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

    /// Stop polling. Idempotent; no status change is observed afterwards.
    pub fn dispose(&self) {
        self.cancel.cancel();
    }
}

impl Drop for StatusMonitor {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(100);

    /// One interval plus a little slack.
    const TICK: Duration = Duration::from_millis(101);

    #[tokio::test(start_paused = true)]
    async fn goes_offline_when_connection_is_down() {
        let flag = SharedAliveFlag::new(true);
        let monitor = StatusMonitor::spawn(Arc::new(flag.clone()), INTERVAL);
        assert_eq!(monitor.current_status(), ConnectionStatus::Online);

        flag.set_alive(false);
        time::sleep(TICK).await;
        assert_eq!(monitor.current_status(), ConnectionStatus::Offline);
    }

    #[tokio::test(start_paused = true)]
    async fn goes_back_online_when_connection_is_reestablished() {
        let flag = SharedAliveFlag::new(true);
        let monitor = StatusMonitor::spawn(Arc::new(flag.clone()), INTERVAL);

        flag.set_alive(false);
        time::sleep(TICK).await;
        assert_eq!(monitor.current_status(), ConnectionStatus::Offline);

        flag.set_alive(true);
        time::sleep(TICK).await;
        assert_eq!(monitor.current_status(), ConnectionStatus::Online);
    }

    #[tokio::test(start_paused = true)]
    async fn probe_error_counts_as_not_alive() {
        let mut probe = MockLivenessProbe::new();
        probe
            .expect_is_alive()
            .returning(|| Err(anyhow::anyhow!("predicate blew up")));

        let monitor = StatusMonitor::spawn(Arc::new(probe), INTERVAL);
        time::sleep(TICK).await;
        assert_eq!(monitor.current_status(), ConnectionStatus::Offline);
    }

    #[tokio::test(start_paused = true)]
    async fn no_check_before_first_interval() {
        let mut probe = MockLivenessProbe::new();
        probe.expect_is_alive().times(0).returning(|| Ok(true));

        let monitor = StatusMonitor::spawn(Arc::new(probe), INTERVAL);
        time::sleep(INTERVAL - Duration::from_millis(1)).await;
        assert_eq!(monitor.current_status(), ConnectionStatus::Online);
    }

    #[tokio::test(start_paused = true)]
    async fn steady_state_emits_no_events() {
        let flag = SharedAliveFlag::new(true);
        let monitor = StatusMonitor::spawn(Arc::new(flag.clone()), INTERVAL);
        let mut sub = monitor.subscribe();

        // Five healthy ticks: no transition, so recv never resolves.
        let recv = time::timeout(INTERVAL * 5, sub.recv());
        assert!(recv.await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn transition_emits_exactly_one_event() {
        let flag = SharedAliveFlag::new(true);
        let monitor = StatusMonitor::spawn(Arc::new(flag.clone()), INTERVAL);
        let mut sub = monitor.subscribe();

        flag.set_alive(false);
        let change = time::timeout(INTERVAL * 3, sub.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(change.status, ConnectionStatus::Offline);

        // Still down: no duplicate event for the same value.
        let dup = time::timeout(INTERVAL * 5, sub.recv());
        assert!(dup.await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn dispose_stops_polling() {
        let flag = SharedAliveFlag::new(true);
        let monitor = StatusMonitor::spawn(Arc::new(flag.clone()), INTERVAL);

        monitor.dispose();
        monitor.dispose();

        flag.set_alive(false);
        time::sleep(INTERVAL * 3).await;
        assert_eq!(monitor.current_status(), ConnectionStatus::Online);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_stops_polling() {
        let flag = SharedAliveFlag::new(true);
        let monitor = StatusMonitor::spawn(Arc::new(flag.clone()), INTERVAL);
        let mut sub = monitor.subscribe();
        drop(monitor);

        flag.set_alive(false);
        let recv = time::timeout(INTERVAL * 3, sub.recv()).await;
        // Cell dropped with the monitor and its task: stream ends.
        assert_eq!(recv.unwrap().map(|c| c.status), None);
    }
}
