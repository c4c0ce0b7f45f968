//! Per-appender delivery queue and listening loop
//!
//! [`AppenderQueue`] bundles what every appender needs to satisfy the
//! [`Appender`](super::Appender) contract: a private delivery channel, a
//! private termination signal, and the loop that renders entries until
//! that signal fires.

use super::config::ChannelCapacity;
use super::error::{LoggerError, Result};
use super::isolation::catch_panic;
use super::listener::ListenerContext;
use super::log_entry::LogEntry;
use super::signal::ShutdownSignal;
use crossbeam_channel::{select, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub struct AppenderQueue {
    sender: Sender<Arc<LogEntry>>,
    receiver: Receiver<Arc<LogEntry>>,
    quit: ShutdownSignal,
    started: AtomicBool,
    capacity: ChannelCapacity,
}

impl AppenderQueue {
    pub fn new(capacity: ChannelCapacity) -> Self {
        let (sender, receiver) = capacity.channel();
        Self {
            sender,
            receiver,
            quit: ShutdownSignal::new(),
            started: AtomicBool::new(false),
            capacity,
        }
    }

    pub fn capacity(&self) -> ChannelCapacity {
        self.capacity
    }

    /// Entries queued but not yet rendered
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_closed(&self) -> bool {
        self.quit.is_triggered()
    }

    /// Hand `entry` to the listener, blocking while the queue is full.
    ///
    /// Once the queue is closed the entry is discarded instead, so a late
    /// push can never wait on a listener that has already exited.
    pub fn push(&self, entry: Arc<LogEntry>) {
        if self.quit.is_triggered() {
            return;
        }
        select! {
            send(self.sender, entry) -> _ => {},
            recv(self.quit.receiver()) -> _ => {},
        }
    }

    /// Deliver the termination signal. Returns `false` if already closed.
    pub fn close(&self) -> bool {
        self.quit.trigger()
    }

    /// Run the listening loop.
    ///
    /// `render` is called for each entry in arrival order; `flush` whenever
    /// the queue runs dry and once more before returning. Errors and panics
    /// from either are reported through `ctx` and never end the loop. On
    /// termination, entries already queued are rendered before completion
    /// is reported.
    pub fn listen<R, F>(&self, name: &str, ctx: ListenerContext, mut render: R, mut flush: F)
    where
        R: FnMut(&LogEntry) -> Result<()>,
        F: FnMut() -> Result<()>,
    {
        if self.started.swap(true, Ordering::AcqRel) {
            eprintln!(
                "[LOGGER WARNING] Logger '{}': appender '{}' is already listening",
                ctx.logger_name(),
                name
            );
            return;
        }

        loop {
            select! {
                recv(self.receiver) -> msg => match msg {
                    Ok(entry) => {
                        Self::guarded(name, &ctx, || render(&entry));
                        if self.receiver.is_empty() {
                            Self::guarded(name, &ctx, &mut flush);
                        }
                    }
                    Err(_) => break,
                },
                recv(self.quit.receiver()) -> _ => {
                    for entry in self.receiver.try_iter() {
                        Self::guarded(name, &ctx, || render(&entry));
                    }
                    break;
                }
            }
        }

        Self::guarded(name, &ctx, &mut flush);
        ctx.complete();
    }

    fn guarded(name: &str, ctx: &ListenerContext, f: impl FnOnce() -> Result<()>) {
        match catch_panic(f) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => ctx.report_failure(name, &e),
            Err(panic_msg) => {
                ctx.report_failure(name, &LoggerError::appender(name, format!("panicked: {}", panic_msg)))
            }
        }
    }
}

impl Default for AppenderQueue {
    fn default() -> Self {
        Self::new(ChannelCapacity::default())
    }
}
