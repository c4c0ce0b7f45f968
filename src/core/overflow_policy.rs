//! Overflow policies for the submission channel
//!
//! When the channel between callers and the dispatcher is full, these
//! policies decide whether `log` waits, drops the message, or fails.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Policy for handling a full submission channel
///
/// # Example
///
/// ```
/// use rust_dispatch_logger::OverflowPolicy;
/// use std::time::Duration;
///
/// // Default behavior: wait for the dispatcher
/// let policy = OverflowPolicy::default();
/// assert_eq!(policy, OverflowPolicy::Block);
///
/// // Wait a little, then drop
/// let policy = OverflowPolicy::BlockWithTimeout(Duration::from_millis(100));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Block until the dispatcher accepts the message
    ///
    /// A slow appender back-pressures every caller of `log`.
    Block,

    /// Block with timeout, then drop with an alert
    BlockWithTimeout(Duration),

    /// Drop new messages silently; only metrics record the loss
    DropNewest,

    /// Drop new messages, alerting on stderr and through the overflow callback
    AlertAndDrop,

    /// Refuse the message: `log` returns `LoggerError::QueueFull`
    Reject,
}

impl OverflowPolicy {
    /// Whether this policy ever gives up on a message instead of waiting for space
    pub fn may_discard(&self) -> bool {
        !matches!(self, OverflowPolicy::Block)
    }
}

impl Default for OverflowPolicy {
    fn default() -> Self {
        OverflowPolicy::Block
    }
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverflowPolicy::Block => write!(f, "Block"),
            OverflowPolicy::BlockWithTimeout(d) => write!(f, "BlockWithTimeout({:?})", d),
            OverflowPolicy::DropNewest => write!(f, "DropNewest"),
            OverflowPolicy::AlertAndDrop => write!(f, "AlertAndDrop"),
            OverflowPolicy::Reject => write!(f, "Reject"),
        }
    }
}

/// Callback type for overflow notifications
///
/// Called when messages are dropped due to a full submission channel.
/// The parameter is the total count of dropped messages so far.
pub type OverflowCallback = Arc<dyn Fn(u64) + Send + Sync>;
