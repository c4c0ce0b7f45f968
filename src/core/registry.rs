//! Appender registry
//!
//! The logger's ordered, growable set of appenders. Each registration binds
//! an appender to the listener thread started for it. The set is guarded by
//! a read-write lock: the dispatcher reads it for every message, while
//! registration and sealing take the write lock, so an appender is either
//! fully registered before a message is fanned out or not seen at all.

use super::appender::Appender;
use super::error::{LoggerError, Result};
use super::isolation::{catch_panic, panic_message};
use super::listener::{AppenderErrorHandler, ListenerContext};
use super::log_entry::LogEntry;
use super::metrics::LoggerMetrics;
use super::tracker::TaskTracker;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Name for a thread owned by logger `logger`.
///
/// Logger and appender names are free-form; an interior NUL would make
/// `thread::Builder::spawn` panic, so it is replaced.
pub(crate) fn thread_name(logger: &str, role: &str) -> String {
    let name = if logger.is_empty() {
        role.to_string()
    } else {
        format!("{}-{}", logger, role)
    };
    name.replace('\0', "\\0")
}

struct Registration {
    appender: Arc<dyn Appender>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

#[derive(Default)]
struct RegistryState {
    registrations: Vec<Registration>,
    sealed: bool,
}

pub(crate) struct AppenderRegistry {
    logger_name: Arc<str>,
    state: RwLock<RegistryState>,
    tracker: TaskTracker,
    metrics: Arc<LoggerMetrics>,
    on_error: Option<AppenderErrorHandler>,
}

impl AppenderRegistry {
    pub(crate) fn new(
        logger_name: Arc<str>,
        tracker: TaskTracker,
        metrics: Arc<LoggerMetrics>,
        on_error: Option<AppenderErrorHandler>,
    ) -> Self {
        Self {
            logger_name,
            state: RwLock::new(RegistryState::default()),
            tracker,
            metrics,
            on_error,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.state.read().registrations.len()
    }

    pub(crate) fn names(&self) -> Vec<String> {
        self.state
            .read()
            .registrations
            .iter()
            .map(|r| r.appender.name().to_string())
            .collect()
    }

    /// Append `appender` and start its listener thread.
    ///
    /// Fails with `Closed` once the registry has been sealed by finalize.
    pub(crate) fn register(&self, appender: Arc<dyn Appender>) -> Result<()> {
        let mut state = self.state.write();
        if state.sealed {
            return Err(LoggerError::Closed);
        }

        let thread_name = thread_name(&self.logger_name, &format!("appender-{}", appender.name()));
        let ctx = ListenerContext::new(
            Arc::clone(&self.logger_name),
            self.tracker.register(),
            Arc::clone(&self.metrics),
            self.on_error.clone(),
        );

        let listening = Arc::clone(&appender);
        let handle = thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || listening.start_listening(ctx))
            .map_err(|e| LoggerError::thread_spawn(thread_name, e))?;

        state.registrations.push(Registration {
            appender,
            listener: Mutex::new(Some(handle)),
        });
        Ok(())
    }

    /// Call `append` on every appender in registration order.
    ///
    /// A panicking appender is reported and skipped; the rest still receive
    /// the entry.
    pub(crate) fn fan_out(&self, entry: Arc<LogEntry>) {
        let state = self.state.read();
        for registration in &state.registrations {
            let appender = &registration.appender;
            if let Err(panic_msg) = catch_panic(|| appender.append(Arc::clone(&entry))) {
                self.metrics.record_appender_failure();
                eprintln!(
                    "[LOGGER CRITICAL] Logger '{}': appender '{}' panicked in append: {}. \
                     Other appenders continue to function.",
                    self.logger_name,
                    appender.name(),
                    panic_msg
                );
            }
        }
        self.metrics.record_dispatched();
    }

    /// Refuse further registrations and finalize every appender in
    /// registration order. Safe to call more than once.
    pub(crate) fn seal_and_finalize(&self) {
        {
            let mut state = self.state.write();
            if state.sealed {
                return;
            }
            state.sealed = true;
        }

        let state = self.state.read();
        for registration in &state.registrations {
            let appender = &registration.appender;
            if let Err(panic_msg) = catch_panic(|| appender.finalize()) {
                eprintln!(
                    "[LOGGER CRITICAL] Logger '{}': appender '{}' panicked in finalize: {}",
                    self.logger_name,
                    appender.name(),
                    panic_msg
                );
            }
        }
    }

    /// Join every listener thread that has finished.
    ///
    /// Only call once the tracker reports no outstanding listeners.
    pub(crate) fn join_listeners(&self) {
        let state = self.state.read();
        for registration in &state.registrations {
            let Some(handle) = registration.listener.lock().take() else {
                continue;
            };
            if let Err(e) = handle.join() {
                eprintln!(
                    "[LOGGER ERROR] Logger '{}': listener for appender '{}' panicked: {}",
                    self.logger_name,
                    registration.appender.name(),
                    panic_message(e.as_ref())
                );
            }
        }
    }
}
