//! Channel sizing and plain logger configuration

use super::error::{LoggerError, Result};
use super::overflow_policy::OverflowPolicy;
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default number of messages a submission channel or appender queue can hold
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Capacity of a message channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelCapacity {
    /// Zero-capacity hand-off: a send completes only when a receiver takes it
    Rendezvous,
    Bounded(usize),
    Unbounded,
}

impl ChannelCapacity {
    pub fn channel<T>(&self) -> (Sender<T>, Receiver<T>) {
        match *self {
            ChannelCapacity::Rendezvous => bounded(0),
            ChannelCapacity::Bounded(n) => bounded(n),
            ChannelCapacity::Unbounded => unbounded(),
        }
    }

    /// Number of buffered messages, `None` when unbounded
    pub fn limit(&self) -> Option<usize> {
        match *self {
            ChannelCapacity::Rendezvous => Some(0),
            ChannelCapacity::Bounded(n) => Some(n),
            ChannelCapacity::Unbounded => None,
        }
    }
}

impl Default for ChannelCapacity {
    fn default() -> Self {
        ChannelCapacity::Bounded(DEFAULT_QUEUE_CAPACITY)
    }
}

impl fmt::Display for ChannelCapacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelCapacity::Rendezvous => write!(f, "rendezvous"),
            ChannelCapacity::Bounded(n) => write!(f, "bounded({})", n),
            ChannelCapacity::Unbounded => write!(f, "unbounded"),
        }
    }
}

/// Serializable logger settings, applied through `LoggerBuilder::from_config`
///
/// # Example
///
/// ```
/// use rust_dispatch_logger::{ChannelCapacity, LoggerConfig, OverflowPolicy};
///
/// let config = LoggerConfig::from_json(
///     r#"{ "name": "api", "capacity": { "bounded": 64 }, "overflow_policy": "drop_newest" }"#,
/// ).unwrap();
///
/// assert_eq!(config.capacity, ChannelCapacity::Bounded(64));
/// assert_eq!(config.overflow_policy, OverflowPolicy::DropNewest);
/// assert_eq!(config.shutdown_timeout_ms, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub name: String,
    pub capacity: ChannelCapacity,
    pub overflow_policy: OverflowPolicy,
    pub shutdown_timeout_ms: Option<u64>,
}

impl LoggerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: LoggerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn shutdown_timeout(&self) -> Option<Duration> {
        self.shutdown_timeout_ms.map(Duration::from_millis)
    }

    /// Reject combinations that can never deliver a message.
    ///
    /// A non-blocking policy on a zero-capacity channel fails every send
    /// that does not find the dispatcher already waiting. The name is
    /// diagnostic only and any value is accepted.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == ChannelCapacity::Rendezvous && self.overflow_policy.may_discard() {
            return Err(LoggerError::config(
                "LoggerConfig",
                format!(
                    "overflow policy {} needs a buffered channel, got {}",
                    self.overflow_policy, self.capacity
                ),
            ));
        }
        Ok(())
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            name: "logger".to_string(),
            capacity: ChannelCapacity::default(),
            overflow_policy: OverflowPolicy::default(),
            shutdown_timeout_ms: None,
        }
    }
}
