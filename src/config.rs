//! Monitor configuration and duration parsing.

use std::time::Duration;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Idle duration before a heartbeat probe fires; also the period between
/// successive probes while they keep succeeding.
pub const DEFAULT_PING_TIMEOUT: Duration = Duration::from_secs(10);

/// Polling cadence of the generic [`crate::monitor::StatusMonitor`].
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(2);

/// Configuration errors.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid number in duration: {0:?}")]
    InvalidNumber(String),
    #[error("unknown duration unit {unit:?} in {input:?}")]
    UnknownUnit { input: String, unit: String },
    #[error("duration must be greater than zero: {0:?}")]
    ZeroDuration(String),
    #[error("{field} must be greater than zero")]
    ZeroField { field: &'static str },
}

/// Tunables for the connection monitors.
///
/// Deserializes from config files with human-friendly duration strings:
///
/// ```json
/// { "ping_timeout": "10s", "check_interval": "500ms" }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorConfig {
    /// Idle time before a heartbeat fires; recurring heartbeat period.
    #[serde(deserialize_with = "duration_from_str")]
    pub ping_timeout: Duration,
    /// Status monitor polling cadence.
    #[serde(deserialize_with = "duration_from_str")]
    pub check_interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            ping_timeout: DEFAULT_PING_TIMEOUT,
            check_interval: DEFAULT_CHECK_INTERVAL,
        }
    }
}

impl MonitorConfig {
    /// Reject zero durations; tokio timers cannot tick at period zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ping_timeout.is_zero() {
            return Err(ConfigError::ZeroField {
                field: "ping_timeout",
            });
        }
        if self.check_interval.is_zero() {
            return Err(ConfigError::ZeroField {
                field: "check_interval",
            });
        }
        Ok(())
    }
}

/// Parse a duration string like "500ms", "30s", "5m", "1h30m".
pub fn parse_duration(s: &str) -> Result<Duration, ConfigError> {
    let mut total = Duration::ZERO;
    let mut rest = s.trim();

    if rest.is_empty() {
        return Err(ConfigError::InvalidNumber(s.to_string()));
    }

    while !rest.is_empty() {
        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (digits, tail) = rest.split_at(digits_end);
        let num: u64 = digits
            .parse()
            .map_err(|_| ConfigError::InvalidNumber(s.to_string()))?;

        let unit_end = tail
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(tail.len());
        let (unit, remainder) = tail.split_at(unit_end);

        total += match unit {
            "ms" => Duration::from_millis(num),
            "s" => Duration::from_secs(num),
            "m" => Duration::from_secs(num * 60),
            "h" => Duration::from_secs(num * 3600),
            "d" => Duration::from_secs(num * 86400),
            _ => {
                return Err(ConfigError::UnknownUnit {
                    input: s.to_string(),
                    unit: unit.to_string(),
                });
            }
        };
        rest = remainder;
    }

    if total.is_zero() {
        return Err(ConfigError::ZeroDuration(s.to_string()));
    }
    Ok(total)
}

fn duration_from_str<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_duration(&s).map_err(serde::de::Error::custom)
}
