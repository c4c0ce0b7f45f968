//! In-memory appender
//!
//! Records every entry it renders into a shared buffer. Clones share the
//! buffer and the queue, so a test can keep one clone and register another.

use crate::core::{
    Appender, AppenderQueue, ChannelCapacity, ListenerContext, LogEntry, Result, ShutdownSignal,
};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

struct Gate {
    opened: ShutdownSignal,
    held: ShutdownSignal,
}

struct MemoryInner {
    name: String,
    queue: AppenderQueue,
    records: Mutex<Vec<LogEntry>>,
    recorded: Condvar,
    gate: Option<Gate>,
}

#[derive(Clone)]
pub struct MemoryAppender {
    inner: Arc<MemoryInner>,
}

impl MemoryAppender {
    pub fn new() -> Self {
        Self::build("memory", ChannelCapacity::default(), None)
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::build(name, ChannelCapacity::default(), None)
    }

    pub fn with_capacity(capacity: ChannelCapacity) -> Self {
        Self::build("memory", capacity, None)
    }

    /// An appender whose listener holds every entry until [`open`](Self::open)
    /// is called. Useful to simulate a destination that cannot keep up.
    pub fn gated() -> Self {
        Self::gated_with_capacity(ChannelCapacity::default())
    }

    /// A gated appender whose private queue has the given capacity.
    pub fn gated_with_capacity(capacity: ChannelCapacity) -> Self {
        Self::build(
            "memory-gated",
            capacity,
            Some(Gate {
                opened: ShutdownSignal::new(),
                held: ShutdownSignal::new(),
            }),
        )
    }

    fn build(name: impl Into<String>, capacity: ChannelCapacity, gate: Option<Gate>) -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                name: name.into(),
                queue: AppenderQueue::new(capacity),
                records: Mutex::new(Vec::new()),
                recorded: Condvar::new(),
                gate,
            }),
        }
    }

    /// Let a gated listener proceed. No-op for ungated appenders.
    pub fn open(&self) {
        if let Some(ref gate) = self.inner.gate {
            gate.opened.trigger();
        }
    }

    /// Wait until a gated listener is holding an entry at the gate.
    pub fn wait_until_held(&self, timeout: Duration) -> bool {
        match self.inner.gate {
            Some(ref gate) => gate.held.wait_timeout(timeout),
            None => false,
        }
    }

    /// Messages rendered so far, in order
    pub fn messages(&self) -> Vec<String> {
        self.inner
            .records
            .lock()
            .iter()
            .map(|e| e.message.clone())
            .collect()
    }

    /// Entries rendered so far, in order
    pub fn entries(&self) -> Vec<LogEntry> {
        self.inner.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Block until at least `count` entries were rendered or `timeout` elapses.
    pub fn wait_for(&self, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut records = self.inner.records.lock();
        while records.len() < count {
            if self
                .inner
                .recorded
                .wait_until(&mut records, deadline)
                .timed_out()
            {
                return records.len() >= count;
            }
        }
        true
    }

    fn record(&self, entry: &LogEntry) -> Result<()> {
        if let Some(ref gate) = self.inner.gate {
            gate.held.trigger();
            gate.opened.wait();
        }
        self.inner.records.lock().push(entry.clone());
        self.inner.recorded.notify_all();
        Ok(())
    }
}

impl Default for MemoryAppender {
    fn default() -> Self {
        Self::new()
    }
}

impl Appender for MemoryAppender {
    fn name(&self) -> &str {
        &self.inner.name
    }

    fn append(&self, entry: Arc<LogEntry>) {
        self.inner.queue.push(entry);
    }

    fn start_listening(&self, ctx: ListenerContext) {
        self.inner
            .queue
            .listen(self.name(), ctx, |entry| self.record(entry), || Ok(()));
    }

    fn finalize(&self) {
        self.inner.queue.close();
    }
}
