//! Central dispatcher
//!
//! One thread per logger. It waits on the submission channel and its own
//! termination signal; each accepted entry is handed to every appender in
//! registration order before the next one is taken. Fan-out is synchronous,
//! so an appender whose queue is full delays the others and, once the
//! submission channel fills up, the callers of `log`.

use super::error::{LoggerError, Result};
use super::log_entry::LogEntry;
use super::registry::{thread_name, AppenderRegistry};
use super::signal::ShutdownSignal;
use super::tracker::CompletionGuard;
use crossbeam_channel::{select, Receiver};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub(crate) struct Dispatcher {
    quit: ShutdownSignal,
    finished: ShutdownSignal,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Dispatcher {
    /// Start the dispatcher thread.
    pub(crate) fn spawn(
        logger_name: &str,
        receiver: Receiver<LogEntry>,
        registry: Arc<AppenderRegistry>,
        completion: CompletionGuard,
    ) -> Result<Self> {
        let quit = ShutdownSignal::new();
        let finished = ShutdownSignal::new();
        let thread_name = thread_name(logger_name, "dispatcher");

        let handle = {
            let quit = quit.clone();
            let finished = finished.clone();
            thread::Builder::new()
                .name(thread_name.clone())
                .spawn(move || {
                    let _done = FinishedGuard {
                        finished,
                        _completion: completion,
                    };
                    Self::run(&receiver, &quit, &registry);
                })
                .map_err(|e| LoggerError::thread_spawn(thread_name, e))?
        };

        Ok(Self {
            quit,
            finished,
            handle: Mutex::new(Some(handle)),
        })
    }

    fn run(receiver: &Receiver<LogEntry>, quit: &ShutdownSignal, registry: &AppenderRegistry) {
        loop {
            select! {
                recv(receiver) -> msg => match msg {
                    Ok(entry) => registry.fan_out(Arc::new(entry)),
                    Err(_) => return,
                },
                recv(quit.receiver()) -> _ => {
                    // Everything accepted before the signal is still delivered
                    for entry in receiver.try_iter() {
                        registry.fan_out(Arc::new(entry));
                    }
                    return;
                }
            }
        }
    }

    /// Deliver the termination signal. Repeated calls are no-ops.
    pub(crate) fn stop(&self) {
        self.quit.trigger();
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.finished.is_triggered()
    }

    /// Wait for the dispatcher loop to exit, up to `timeout` when given.
    ///
    /// Returns `true` once it has exited.
    pub(crate) fn wait(&self, timeout: Option<Duration>) -> bool {
        match timeout {
            Some(t) => self.finished.wait_timeout(t),
            None => {
                self.finished.wait();
                true
            }
        }
    }

    /// Join the thread once it has finished, reporting a panic.
    pub(crate) fn join(&self, logger_name: &str) {
        if !self.is_finished() {
            return;
        }
        if let Some(handle) = self.handle.lock().take() {
            if let Err(e) = handle.join() {
                eprintln!(
                    "[LOGGER ERROR] Logger '{}': dispatcher thread panicked: {}",
                    logger_name,
                    super::isolation::panic_message(e.as_ref())
                );
            }
        }
    }
}

/// Reports the dispatcher finished, also when its loop unwinds.
struct FinishedGuard {
    finished: ShutdownSignal,
    _completion: CompletionGuard,
}

impl Drop for FinishedGuard {
    fn drop(&mut self) {
        self.finished.trigger();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appenders::MemoryAppender;
    use crate::core::log_level::LogLevel;
    use crate::core::metrics::LoggerMetrics;
    use crate::core::tracker::TaskTracker;
    use crossbeam_channel::bounded;

    #[test]
    fn test_stop_drains_accepted_entries() {
        let tracker = TaskTracker::new();
        let metrics = Arc::new(LoggerMetrics::new());
        let registry = Arc::new(AppenderRegistry::new(
            Arc::from("dispatch-test"),
            tracker.clone(),
            Arc::clone(&metrics),
            None,
        ));
        let memory = MemoryAppender::new();
        registry.register(Arc::new(memory.clone())).unwrap();

        let (sender, receiver) = bounded(16);
        for message in ["one", "two", "three"] {
            sender.send(LogEntry::new(LogLevel::Info, message)).unwrap();
        }

        let dispatcher =
            Dispatcher::spawn("dispatch-test", receiver, Arc::clone(&registry), tracker.register())
                .unwrap();
        dispatcher.stop();
        dispatcher.stop();
        assert!(dispatcher.wait(Some(Duration::from_secs(5))));
        dispatcher.join("dispatch-test");

        registry.seal_and_finalize();
        assert!(tracker.wait_timeout(Duration::from_secs(5)));
        assert_eq!(memory.messages(), vec!["one", "two", "three"]);
        assert_eq!(metrics.dispatched(), 3);
        drop(sender);
    }

    #[test]
    fn test_exits_when_all_senders_dropped() {
        let tracker = TaskTracker::new();
        let registry = Arc::new(AppenderRegistry::new(
            Arc::from("dispatch-test"),
            tracker.clone(),
            Arc::new(LoggerMetrics::new()),
            None,
        ));

        let (sender, receiver) = bounded::<LogEntry>(1);
        let dispatcher =
            Dispatcher::spawn("dispatch-test", receiver, registry, tracker.register()).unwrap();
        drop(sender);

        assert!(dispatcher.wait(Some(Duration::from_secs(5))));
        assert!(dispatcher.is_finished());
        assert!(tracker.wait_timeout(Duration::from_secs(5)));
    }
}
