//! Appender capability for log output destinations
//!
//! Every destination owns a private delivery channel and a private
//! termination signal. The logger drives it through three operations:
//!
//! - [`Appender::append`] is called by the dispatcher for every message and
//!   only hands the entry off to the appender's own queue.
//! - [`Appender::start_listening`] runs on the appender's dedicated listener
//!   thread and performs the actual output until the appender is finalized.
//! - [`Appender::finalize`] delivers the termination signal.
//!
//! Most implementations compose an [`AppenderQueue`](super::AppenderQueue),
//! which provides all three.

use super::listener::ListenerContext;
use super::log_entry::LogEntry;
use std::sync::Arc;

pub trait Appender: Send + Sync {
    fn name(&self) -> &str;

    /// Enqueue `entry` for this appender.
    ///
    /// Must not fail. Blocking on a bounded queue is the only allowed
    /// back-pressure.
    fn append(&self, entry: Arc<LogEntry>);

    /// Listen for entries until the termination signal is observed.
    ///
    /// Called exactly once, on a thread of its own, right after
    /// registration. Dropping `ctx` reports completion to the logger.
    fn start_listening(&self, ctx: ListenerContext);

    /// Deliver the termination signal to the listener. Repeated calls are no-ops.
    fn finalize(&self);
}

impl<A: Appender + ?Sized> Appender for Arc<A> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn append(&self, entry: Arc<LogEntry>) {
        (**self).append(entry)
    }

    fn start_listening(&self, ctx: ListenerContext) {
        (**self).start_listening(ctx)
    }

    fn finalize(&self) {
        (**self).finalize()
    }
}
