//! Transport-coupled connection monitor (composition root).
//!
//! Wires transport lifecycle events and the heartbeat scheduler into
//! the authoritative status exposed to subscribers. This is the piece
//! an application holds on to; the generic polling monitor in
//! [`crate::monitor`] stays available for non-transport liveness
//! sources.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::info;

use crate::config::MonitorConfig;
use crate::heartbeat::HeartbeatScheduler;
use crate::status::{ConnectionStatus, StatusSubscription};
use crate::transport::{PingService, TransportEvent};

/// Connection-health monitor over a transport event source.
pub struct ConnectionMonitor {
    scheduler: HeartbeatScheduler,
}

impl ConnectionMonitor {
    /// Validate the configuration and spawn the monitor.
    ///
    /// `events` is the receiver half of a [`crate::transport::TransportSink`]
    /// channel; `ping` is the transport's probe. Must be called within a
    /// tokio runtime.
    pub fn spawn(
        ping: Arc<dyn PingService>,
        events: mpsc::UnboundedReceiver<TransportEvent>,
        config: &MonitorConfig,
    ) -> Result<Self> {
        config.validate()?;
        info!(ping_timeout = ?config.ping_timeout, "starting connection monitor");
        let scheduler = HeartbeatScheduler::spawn(ping, events, config.ping_timeout);
        Ok(Self { scheduler })
    }

    /// Current status; pure read.
    pub fn current_status(&self) -> ConnectionStatus {
        self.scheduler.current_status()
    }

    /// Subscribe to status transitions.
    pub fn subscribe(&self) -> StatusSubscription {
        self.scheduler.subscribe()
    }

    /// Dispose the underlying scheduler. Idempotent.
    pub fn dispose(&self) {
        self.scheduler.dispose();
    }
}
