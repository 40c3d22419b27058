//! Transport event source abstraction.
//!
//! The monitor does not own the transport; it consumes three lifecycle
//! signals from it and calls back into it with a liveness probe. A real
//! adapter holds a [`TransportSink`] and fires events as the underlying
//! socket/tunnel reports them; [`mock`] provides a test double that fires
//! them directly.

pub mod mock;

use anyhow::Result;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tokio::sync::mpsc;

/// A transport lifecycle signal, delivered at most once per physical event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEvent {
    /// The transport (re)established its connection.
    Opened,
    /// The transport lost its connection.
    Closed,
    /// Any inbound traffic arrived on the transport.
    Activity,
}

/// Active liveness probe offered by the transport.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PingService: Send + Sync {
    /// Probe the connection. Resolves on success, errors on failure.
    /// Must not block the caller.
    async fn ping(&self) -> Result<()>;
}

/// Handle used by transport adapters to publish lifecycle events.
///
/// Clonable; sends after the consuming monitor is disposed are no-ops.
#[derive(Debug, Clone)]
pub struct TransportSink {
    tx: mpsc::UnboundedSender<TransportEvent>,
}

impl TransportSink {
    /// Create a sink and the receiver half a monitor consumes.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TransportEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn opened(&self) {
        self.send(TransportEvent::Opened);
    }

    pub fn closed(&self) {
        self.send(TransportEvent::Closed);
    }

    pub fn activity(&self) {
        self.send(TransportEvent::Activity);
    }

    fn send(&self, event: TransportEvent) {
        // Receiver gone means the monitor was disposed; drop silently.
        let _ = self.tx.send(event);
    }
}
