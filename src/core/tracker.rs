//! Outstanding-task tracking
//!
//! [`TaskTracker`] counts running dispatcher and listener tasks. Each task
//! holds a [`CompletionGuard`]; dropping the guard reports completion, so a
//! task that unwinds still counts as finished.

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct TrackerInner {
    outstanding: Mutex<usize>,
    all_done: Condvar,
}

#[derive(Debug, Clone, Default)]
pub struct TaskTracker {
    inner: Arc<TrackerInner>,
}

impl TaskTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one more outstanding task.
    #[must_use = "dropping the guard immediately reports the task as finished"]
    pub fn register(&self) -> CompletionGuard {
        *self.inner.outstanding.lock() += 1;
        CompletionGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn outstanding(&self) -> usize {
        *self.inner.outstanding.lock()
    }

    /// Block until every registered task has completed.
    pub fn wait(&self) {
        let mut outstanding = self.inner.outstanding.lock();
        while *outstanding > 0 {
            self.inner.all_done.wait(&mut outstanding);
        }
    }

    /// Block until every registered task has completed or the deadline passes.
    ///
    /// Returns `true` when the count reached zero.
    pub fn wait_until(&self, deadline: Instant) -> bool {
        let mut outstanding = self.inner.outstanding.lock();
        while *outstanding > 0 {
            if self
                .inner
                .all_done
                .wait_until(&mut outstanding, deadline)
                .timed_out()
            {
                return *outstanding == 0;
            }
        }
        true
    }

    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        self.wait_until(Instant::now() + timeout)
    }
}

/// Held by a running task; dropping it reports the task as complete.
#[derive(Debug)]
pub struct CompletionGuard {
    inner: Arc<TrackerInner>,
}

impl CompletionGuard {
    /// Report completion explicitly.
    pub fn complete(self) {
        drop(self);
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        let mut outstanding = self.inner.outstanding.lock();
        *outstanding = outstanding.saturating_sub(1);
        if *outstanding == 0 {
            self.inner.all_done.notify_all();
        }
    }
}
