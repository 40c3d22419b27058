//! Mock transport for testing.
//!
//! Simulates a transport event source whose signals a test fires
//! directly, plus a recording ping service with scriptable outcomes.
//! Useful for unit-testing the monitors without a real connection.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Result, bail};
use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::transport::{PingService, TransportEvent, TransportSink};

// ── Ping double ──────────────────────────────────────────────────

/// Ping service that counts invocations and replays scripted outcomes.
///
/// Outcomes are consumed front-to-back; once the script is exhausted,
/// every further ping succeeds.
#[derive(Debug, Default)]
pub struct RecordingPing {
    calls: AtomicUsize,
    script: Mutex<VecDeque<bool>>,
}

impl RecordingPing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pings received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Acquire)
    }

    /// Script the next unscripted ping to fail.
    pub fn fail_next(&self) {
        self.push_outcome(false);
    }

    /// Append an outcome (`true` = success) to the script.
    pub fn push_outcome(&self, ok: bool) {
        self.script
            .lock()
            .expect("ping script lock poisoned")
            .push_back(ok);
    }
}

#[async_trait]
impl PingService for RecordingPing {
    async fn ping(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::AcqRel);
        let ok = self
            .script
            .lock()
            .expect("ping script lock poisoned")
            .pop_front()
            .unwrap_or(true);
        if ok {
            Ok(())
        } else {
            bail!("scripted ping failure");
        }
    }
}

// ── Transport double ─────────────────────────────────────────────

/// Mock transport whose events a test fires by hand.
pub struct MockConnectionProvider {
    sink: TransportSink,
}

impl MockConnectionProvider {
    /// Create the provider and the event receiver a monitor consumes.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TransportEvent>) {
        let (sink, rx) = TransportSink::channel();
        (Self { sink }, rx)
    }

    pub fn socket_opened(&self) {
        self.sink.opened();
    }

    pub fn socket_closed(&self) {
        self.sink.closed();
    }

    pub fn socket_activity(&self) {
        self.sink.activity();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn recording_ping_counts_calls() {
        let ping = RecordingPing::new();
        assert_eq!(ping.calls(), 0);
        ping.ping().await.unwrap();
        ping.ping().await.unwrap();
        assert_eq!(ping.calls(), 2);
    }

    #[tokio::test]
    async fn recording_ping_replays_script_then_succeeds() {
        let ping = RecordingPing::new();
        ping.fail_next();
        ping.push_outcome(true);
        ping.fail_next();

        assert!(ping.ping().await.is_err());
        assert!(ping.ping().await.is_ok());
        assert!(ping.ping().await.is_err());
        // Script exhausted; back to succeeding.
        assert!(ping.ping().await.is_ok());
        assert_eq!(ping.calls(), 4);
    }

    #[tokio::test]
    async fn provider_forwards_each_signal() {
        let (provider, mut rx) = MockConnectionProvider::new();
        provider.socket_opened();
        provider.socket_activity();
        provider.socket_closed();

        assert_eq!(rx.recv().await, Some(TransportEvent::Opened));
        assert_eq!(rx.recv().await, Some(TransportEvent::Activity));
        assert_eq!(rx.recv().await, Some(TransportEvent::Closed));
    }
}
