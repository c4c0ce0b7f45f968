//! Context handed to an appender's listener task

use super::error::LoggerError;
use super::metrics::LoggerMetrics;
use super::tracker::CompletionGuard;
use std::fmt;
use std::sync::Arc;

/// Hook invoked when an appender fails to render an entry.
///
/// Receives the appender name and the error. The listener keeps running
/// after the hook returns.
pub type AppenderErrorHandler = Arc<dyn Fn(&str, &LoggerError) + Send + Sync>;

/// What a listener task gets from the logger that started it.
///
/// Holds the task's [`CompletionGuard`]: completion is reported when the
/// context is dropped or [`ListenerContext::complete`] is called.
pub struct ListenerContext {
    logger_name: Arc<str>,
    completion: CompletionGuard,
    metrics: Arc<LoggerMetrics>,
    on_error: Option<AppenderErrorHandler>,
}

impl ListenerContext {
    pub fn new(
        logger_name: Arc<str>,
        completion: CompletionGuard,
        metrics: Arc<LoggerMetrics>,
        on_error: Option<AppenderErrorHandler>,
    ) -> Self {
        Self {
            logger_name,
            completion,
            metrics,
            on_error,
        }
    }

    pub fn logger_name(&self) -> &str {
        &self.logger_name
    }

    /// Report a render failure local to `appender`.
    pub fn report_failure(&self, appender: &str, error: &LoggerError) {
        self.metrics.record_appender_failure();
        match self.on_error {
            Some(ref handler) => handler(appender, error),
            None => eprintln!(
                "[LOGGER ERROR] Logger '{}': appender '{}' failed: {}",
                self.logger_name, appender, error
            ),
        }
    }

    /// Report this listener as finished.
    pub fn complete(self) {
        self.completion.complete();
    }
}

impl fmt::Debug for ListenerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerContext")
            .field("logger_name", &self.logger_name)
            .field("has_error_handler", &self.on_error.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tracker::TaskTracker;
    use parking_lot::Mutex;

    #[test]
    fn test_complete_reports_to_tracker() {
        let tracker = TaskTracker::new();
        let ctx = ListenerContext::new(
            Arc::from("test"),
            tracker.register(),
            Arc::new(LoggerMetrics::new()),
            None,
        );
        assert_eq!(tracker.outstanding(), 1);
        ctx.complete();
        assert_eq!(tracker.outstanding(), 0);
    }

    #[test]
    fn test_report_failure_uses_handler() {
        let tracker = TaskTracker::new();
        let metrics = Arc::new(LoggerMetrics::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);

        let ctx = ListenerContext::new(
            Arc::from("test"),
            tracker.register(),
            Arc::clone(&metrics),
            Some(Arc::new(move |name: &str, err: &LoggerError| {
                seen_clone.lock().push(format!("{}: {}", name, err));
            })),
        );

        ctx.report_failure("file", &LoggerError::writer("disk full"));

        assert_eq!(metrics.appender_failures(), 1);
        assert_eq!(seen.lock().as_slice(), ["file: Writer error: disk full"]);
    }
}
