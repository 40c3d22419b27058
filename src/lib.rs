//! Linkwatch - connection-health monitoring for long-lived sessions
//!
//! This crate tracks whether a logical connection to a remote peer is
//! reachable and exposes that as an observable two-state value, including:
//! - Generic status monitor polling an abstract liveness predicate
//! - Debounced, self-rescheduling heartbeat driven by transport events
//! - Transport-coupled connection monitor composing the two
//! - Mock transport doubles for testing without a real connection

pub mod config;
pub mod connection;
pub mod heartbeat;
pub mod monitor;
pub mod status;
pub mod transport;

pub use config::MonitorConfig;
pub use connection::ConnectionMonitor;
pub use monitor::{LivenessProbe, SharedAliveFlag, StatusMonitor};
pub use status::{ConnectionStatus, StatusChange, StatusSubscription};
pub use transport::{PingService, TransportEvent, TransportSink};
