//! Main logger implementation
//!
//! [`Logger`] is the process-visible handle. Construction registers the
//! initial appenders (each with its own listener thread) and starts the
//! dispatcher. `log` hands a message to the dispatcher; `finalize` shuts
//! everything down top-down.

use super::{
    appender::Appender,
    config::{ChannelCapacity, LoggerConfig},
    dispatcher::Dispatcher,
    error::{LoggerError, Result},
    listener::AppenderErrorHandler,
    log_entry::LogEntry,
    log_level::LogLevel,
    metrics::LoggerMetrics,
    overflow_policy::{OverflowCallback, OverflowPolicy},
    registry::AppenderRegistry,
    tracker::TaskTracker,
};
use crossbeam_channel::{SendTimeoutError, Sender, TrySendError};
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default shutdown timeout for logger cleanup (5 seconds)
///
/// Used when a logger is dropped without an explicit `finalize`.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Lifecycle of a [`Logger`]. There is no transition back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggerState {
    /// Appenders are being registered and the dispatcher started.
    ///
    /// Only held inside [`LoggerBuilder`]; a handle returned by
    /// `Logger::new` or `build` is already `Running`.
    Constructing = 0,
    Running = 1,
    Finalizing = 2,
    Finalized = 3,
}

impl LoggerState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => LoggerState::Constructing,
            1 => LoggerState::Running,
            2 => LoggerState::Finalizing,
            _ => LoggerState::Finalized,
        }
    }
}

impl fmt::Display for LoggerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggerState::Constructing => write!(f, "Constructing"),
            LoggerState::Running => write!(f, "Running"),
            LoggerState::Finalizing => write!(f, "Finalizing"),
            LoggerState::Finalized => write!(f, "Finalized"),
        }
    }
}

pub struct Logger {
    name: Arc<str>,
    state: AtomicU8,
    /// Taken by finalize; `None` means submissions are refused
    sender: RwLock<Option<Sender<LogEntry>>>,
    capacity: ChannelCapacity,
    registry: Arc<AppenderRegistry>,
    dispatcher: Dispatcher,
    /// Dispatcher plus one listener per appender
    tracker: TaskTracker,
    metrics: Arc<LoggerMetrics>,
    overflow_policy: OverflowPolicy,
    on_overflow: Option<OverflowCallback>,
    shutdown_timeout: Option<Duration>,
}

impl Logger {
    /// Create a logger with the given initial appenders and start its dispatcher.
    ///
    /// An appender whose listener thread cannot be started is reported on
    /// stderr and skipped.
    ///
    /// # Panics
    ///
    /// Panics if the operating system refuses to start the dispatcher
    /// thread, like `std::thread::spawn`. Use [`LoggerBuilder::try_build`]
    /// to handle that case.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_dispatch_logger::prelude::*;
    ///
    /// let memory = MemoryAppender::new();
    /// let logger = Logger::new("app", vec![Box::new(memory.clone())]);
    ///
    /// logger.log(LogLevel::Info, "hello").unwrap();
    /// logger.finalize().unwrap();
    ///
    /// assert_eq!(memory.messages(), vec!["hello"]);
    /// ```
    #[must_use]
    pub fn new(name: impl Into<String>, appenders: Vec<Box<dyn Appender>>) -> Self {
        appenders
            .into_iter()
            .fold(Logger::builder().name(name), |builder, appender| {
                builder.boxed_appender(appender)
            })
            .build()
    }

    /// Create a builder for Logger
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> LoggerState {
        LoggerState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn appender_count(&self) -> usize {
        self.registry.len()
    }

    /// Appender names in registration order
    pub fn appender_names(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Dispatcher and listener tasks that have not reported completion yet
    pub fn outstanding_tasks(&self) -> usize {
        self.tracker.outstanding()
    }

    pub fn capacity(&self) -> ChannelCapacity {
        self.capacity
    }

    pub fn overflow_policy(&self) -> &OverflowPolicy {
        &self.overflow_policy
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    pub fn dropped_count(&self) -> u64 {
        self.metrics.dropped_count()
    }

    /// Register another appender and start its listener thread.
    ///
    /// Returns [`LoggerError::Closed`] once `finalize` has begun.
    pub fn add_appender(&self, appender: Box<dyn Appender>) -> Result<()> {
        self.add_shared(Arc::from(appender))
    }

    /// Register an appender the caller keeps a handle to.
    pub fn add_shared(&self, appender: Arc<dyn Appender>) -> Result<()> {
        if self.state() != LoggerState::Running {
            return Err(LoggerError::Closed);
        }
        self.registry.register(appender)
    }

    /// Submit a message to the dispatcher.
    ///
    /// Returns once the submission channel has accepted the message; the
    /// appenders render it later on their own threads. What happens when
    /// the channel is full depends on the [`OverflowPolicy`].
    ///
    /// Returns [`LoggerError::Closed`] once `finalize` has begun. The level
    /// is carried to the appenders but never used for filtering.
    pub fn log(&self, level: LogLevel, message: impl Into<String>) -> Result<()> {
        let sender = self.sender.read();
        let Some(sender) = sender.as_ref() else {
            return Err(LoggerError::Closed);
        };

        let entry = LogEntry::new(level, message);
        match sender.try_send(entry) {
            Ok(()) => {
                self.metrics.record_submitted();
                Ok(())
            }
            Err(TrySendError::Full(entry)) => self.handle_overflow(sender, entry),
            Err(TrySendError::Disconnected(_)) => Err(LoggerError::Closed),
        }
    }

    #[inline]
    pub fn info(&self, message: impl Into<String>) -> Result<()> {
        self.log(LogLevel::Info, message)
    }

    #[inline]
    pub fn debug(&self, message: impl Into<String>) -> Result<()> {
        self.log(LogLevel::Debug, message)
    }

    #[inline]
    pub fn warn(&self, message: impl Into<String>) -> Result<()> {
        self.log(LogLevel::Warn, message)
    }

    #[inline]
    pub fn error(&self, message: impl Into<String>) -> Result<()> {
        self.log(LogLevel::Error, message)
    }

    /// Handle a full submission channel according to the overflow policy
    fn handle_overflow(&self, sender: &Sender<LogEntry>, entry: LogEntry) -> Result<()> {
        self.metrics.record_queue_full();

        match &self.overflow_policy {
            OverflowPolicy::Block => {
                self.metrics.record_block();
                sender.send(entry).map_err(|_| LoggerError::Closed)?;
                self.metrics.record_submitted();
                Ok(())
            }

            OverflowPolicy::BlockWithTimeout(timeout) => {
                self.metrics.record_block();
                match sender.send_timeout(entry, *timeout) {
                    Ok(()) => {
                        self.metrics.record_submitted();
                        Ok(())
                    }
                    Err(SendTimeoutError::Timeout(_)) => {
                        self.alert_and_drop();
                        Ok(())
                    }
                    Err(SendTimeoutError::Disconnected(_)) => Err(LoggerError::Closed),
                }
            }

            OverflowPolicy::DropNewest => {
                self.metrics.record_dropped();
                Ok(())
            }

            OverflowPolicy::AlertAndDrop => {
                self.alert_and_drop();
                Ok(())
            }

            OverflowPolicy::Reject => {
                self.metrics.record_dropped();
                Err(LoggerError::queue_full(self.capacity.limit().unwrap_or(0)))
            }
        }
    }

    fn alert_and_drop(&self) {
        let dropped_count = self.metrics.record_dropped();

        // Alert on first drop and periodically thereafter
        let should_alert = dropped_count == 0 || (dropped_count + 1) % 1000 == 0;

        if should_alert {
            eprintln!(
                "[LOGGER WARNING] Logger '{}': queue full, {} logs dropped. \
                 Consider increasing the channel capacity or using a different overflow policy.",
                self.name,
                dropped_count + 1
            );

            if let Some(ref callback) = self.on_overflow {
                callback(dropped_count + 1);
            }
        }
    }

    /// Shut the logger down, waiting up to the configured shutdown timeout
    /// (indefinitely when none was configured).
    ///
    /// Stops accepting messages, lets the dispatcher deliver everything
    /// already accepted, finalizes every appender in registration order, and
    /// waits for the dispatcher and all listener tasks to report completion.
    ///
    /// Calling it again, from any thread, waits for the same completion and
    /// returns `Ok(())`; it never deadlocks on an already finalized logger.
    pub fn finalize(&self) -> Result<()> {
        self.finalize_with(self.shutdown_timeout)
    }

    /// Like [`Logger::finalize`] with an explicit time budget.
    ///
    /// Returns [`LoggerError::ShutdownTimeout`] if tasks are still running
    /// when the budget runs out; calling again resumes waiting.
    pub fn finalize_timeout(&self, timeout: Duration) -> Result<()> {
        self.finalize_with(Some(timeout))
    }

    fn finalize_with(&self, timeout: Option<Duration>) -> Result<()> {
        let deadline = timeout.map(|t| Instant::now() + t);
        let remaining = || deadline.map(|d| d.saturating_duration_since(Instant::now()));

        let _ = self.state.compare_exchange(
            LoggerState::Running as u8,
            LoggerState::Finalizing as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );

        // Waits for in-flight `log` calls, then refuses new ones. A call
        // blocked on a full channel holds its read guard, so the wait is
        // bounded by the deadline too.
        let mut sender = match deadline {
            Some(d) => self
                .sender
                .try_write_until(d)
                .ok_or_else(|| LoggerError::shutdown_timeout(self.tracker.outstanding()))?,
            None => self.sender.write(),
        };
        drop(sender.take());
        drop(sender);

        self.dispatcher.stop();
        if !self.dispatcher.wait(remaining()) {
            return Err(LoggerError::shutdown_timeout(self.tracker.outstanding()));
        }

        self.registry.seal_and_finalize();

        let all_done = match deadline {
            Some(d) => self.tracker.wait_until(d),
            None => {
                self.tracker.wait();
                true
            }
        };
        if !all_done {
            return Err(LoggerError::shutdown_timeout(self.tracker.outstanding()));
        }

        self.dispatcher.join(&self.name);
        self.registry.join_listeners();

        let previous = self
            .state
            .swap(LoggerState::Finalized as u8, Ordering::AcqRel);
        if previous != LoggerState::Finalized as u8 {
            let dropped = self.metrics.dropped_count();
            if dropped > 0 {
                eprintln!(
                    "[LOGGER WARNING] Logger '{}' finalized with {} dropped logs (drop rate: {:.2}%)",
                    self.name,
                    dropped,
                    self.metrics.drop_rate()
                );
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("appenders", &self.appender_names())
            .field("capacity", &self.capacity)
            .field("overflow_policy", &self.overflow_policy)
            .finish()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.state() == LoggerState::Finalized {
            return;
        }
        if let Err(e) = self.finalize_with(Some(DEFAULT_SHUTDOWN_TIMEOUT)) {
            eprintln!(
                "[LOGGER WARNING] Logger '{}' did not shut down cleanly: {}. Some logs may be lost.",
                self.name, e
            );
        }
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use rust_dispatch_logger::prelude::*;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let logger = Logger::builder()
///     .name("api")
///     .appender(MemoryAppender::new())
///     .capacity(ChannelCapacity::Bounded(256))
///     .overflow_policy(OverflowPolicy::AlertAndDrop)
///     .on_overflow(Arc::new(|count| {
///         eprintln!("ALERT: {} logs dropped", count);
///     }))
///     .shutdown_timeout(Duration::from_secs(2))
///     .build();
///
/// logger.finalize().unwrap();
/// ```
pub struct LoggerBuilder {
    name: String,
    appenders: Vec<Arc<dyn Appender>>,
    capacity: ChannelCapacity,
    overflow_policy: OverflowPolicy,
    on_overflow: Option<OverflowCallback>,
    on_appender_error: Option<AppenderErrorHandler>,
    shutdown_timeout: Option<Duration>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::from_config(&LoggerConfig::default())
    }

    /// Start from plain configuration values
    pub fn from_config(config: &LoggerConfig) -> Self {
        Self {
            name: config.name.clone(),
            appenders: Vec::new(),
            capacity: config.capacity,
            overflow_policy: config.overflow_policy.clone(),
            on_overflow: None,
            on_appender_error: None,
            shutdown_timeout: config.shutdown_timeout(),
        }
    }

    /// Logger name, used in thread names and diagnostics
    #[must_use = "builder methods return a new value"]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Add an appender
    #[must_use = "builder methods return a new value"]
    pub fn appender<A: Appender + 'static>(mut self, appender: A) -> Self {
        self.appenders.push(Arc::new(appender));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn boxed_appender(mut self, appender: Box<dyn Appender>) -> Self {
        self.appenders.push(Arc::from(appender));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn shared_appender(mut self, appender: Arc<dyn Appender>) -> Self {
        self.appenders.push(appender);
        self
    }

    /// Capacity of the submission channel between callers and the dispatcher
    #[must_use = "builder methods return a new value"]
    pub fn capacity(mut self, capacity: ChannelCapacity) -> Self {
        self.capacity = capacity;
        self
    }

    /// What `log` does when the submission channel is full. Default is `Block`.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_dispatch_logger::prelude::*;
    /// use std::time::Duration;
    ///
    /// let logger = Logger::builder()
    ///     .capacity(ChannelCapacity::Bounded(100))
    ///     .overflow_policy(OverflowPolicy::BlockWithTimeout(Duration::from_millis(50)))
    ///     .build();
    /// # logger.finalize().unwrap();
    /// ```
    #[must_use = "builder methods return a new value"]
    pub fn overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }

    /// Set a callback for overflow notifications
    ///
    /// Invoked when messages are dropped under `AlertAndDrop` or
    /// `BlockWithTimeout`, with the total count of dropped messages.
    #[must_use = "builder methods return a new value"]
    pub fn on_overflow(mut self, callback: OverflowCallback) -> Self {
        self.on_overflow = Some(callback);
        self
    }

    /// Receive render failures reported by appenders instead of the
    /// default stderr line.
    #[must_use = "builder methods return a new value"]
    pub fn on_appender_error(mut self, handler: AppenderErrorHandler) -> Self {
        self.on_appender_error = Some(handler);
        self
    }

    /// Budget for `finalize`. Without one, `finalize` waits indefinitely.
    #[must_use = "builder methods return a new value"]
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = Some(timeout);
        self
    }

    /// Build the Logger, reporting invalid settings or thread start failures.
    pub fn try_build(self) -> Result<Logger> {
        self.start(true)
    }

    /// Build the Logger
    ///
    /// An appender whose listener thread cannot be started is reported on
    /// stderr and left out; the logger runs with the others.
    ///
    /// # Panics
    ///
    /// Panics on invalid settings (a dropping or rejecting policy with a
    /// rendezvous channel) or when the dispatcher thread
    /// cannot be started. Use [`LoggerBuilder::try_build`] to handle those
    /// cases.
    pub fn build(self) -> Logger {
        match self.start(false) {
            Ok(logger) => logger,
            Err(e) => panic!("failed to start logger: {}", e),
        }
    }

    fn start(self, strict: bool) -> Result<Logger> {
        LoggerConfig {
            name: self.name.clone(),
            capacity: self.capacity,
            overflow_policy: self.overflow_policy.clone(),
            shutdown_timeout_ms: None,
        }
        .validate()?;

        let state = AtomicU8::new(LoggerState::Constructing as u8);
        let name: Arc<str> = Arc::from(self.name);
        let tracker = TaskTracker::new();
        let metrics = Arc::new(LoggerMetrics::new());
        let registry = Arc::new(AppenderRegistry::new(
            Arc::clone(&name),
            tracker.clone(),
            Arc::clone(&metrics),
            self.on_appender_error,
        ));

        for appender in self.appenders {
            let appender_name = appender.name().to_string();
            match registry.register(appender) {
                Ok(()) => {}
                Err(e) if !strict => eprintln!(
                    "[LOGGER ERROR] Logger '{}': appender '{}' skipped: {}",
                    name, appender_name, e
                ),
                Err(e) => {
                    registry.seal_and_finalize();
                    tracker.wait();
                    registry.join_listeners();
                    return Err(e);
                }
            }
        }

        let (sender, receiver) = self.capacity.channel();
        let dispatcher = match Dispatcher::spawn(
            &name,
            receiver,
            Arc::clone(&registry),
            tracker.register(),
        ) {
            Ok(dispatcher) => dispatcher,
            Err(e) => {
                registry.seal_and_finalize();
                tracker.wait();
                registry.join_listeners();
                return Err(e);
            }
        };

        state.store(LoggerState::Running as u8, Ordering::Release);
        Ok(Logger {
            name,
            state,
            sender: RwLock::new(Some(sender)),
            capacity: self.capacity,
            registry,
            dispatcher,
            tracker,
            metrics,
            overflow_policy: self.overflow_policy,
            on_overflow: self.on_overflow,
            shutdown_timeout: self.shutdown_timeout,
        })
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
