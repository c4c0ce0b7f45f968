//! Logging macros for ergonomic log message formatting.
//!
//! These macros format their arguments like `format!` and submit the result.
//! The submission result is discarded: a message logged after `finalize`
//! is silently lost. Call [`Logger::log`](crate::Logger::log) directly to
//! observe [`LoggerError::Closed`](crate::LoggerError::Closed).
//!
//! # Examples
//!
//! ```
//! use rust_dispatch_logger::prelude::*;
//! use rust_dispatch_logger::info;
//!
//! let logger = Logger::new("server", vec![]);
//!
//! info!(logger, "Server started");
//!
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//! # logger.finalize().unwrap();
//! ```

/// Log a message at an explicit level.
///
/// # Examples
///
/// ```
/// # use rust_dispatch_logger::prelude::*;
/// # let logger = Logger::new("docs", vec![]);
/// use rust_dispatch_logger::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        let _ = $logger.log($level, format!($($arg)+));
    }};
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a debug-level message.
///
/// # Examples
///
/// ```
/// # use rust_dispatch_logger::prelude::*;
/// # let logger = Logger::new("docs", vec![]);
/// use rust_dispatch_logger::debug;
/// debug!(logger, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use rust_dispatch_logger::prelude::*;
/// # let logger = Logger::new("docs", vec![]);
/// use rust_dispatch_logger::error;
/// error!(logger, "Error code: {}, message: {}", 500, "Internal error");
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::appenders::MemoryAppender;
    use crate::core::{LogLevel, Logger};

    #[test]
    fn test_macros_submit_formatted_messages() {
        let memory = MemoryAppender::new();
        let logger = Logger::new("macros", vec![Box::new(memory.clone())]);

        log!(logger, LogLevel::Info, "Formatted: {}", 42);
        info!(logger, "Items: {}", 100);
        debug!(logger, "Count: {}", 5);
        warn!(logger, "Retry {} of {}", 1, 3);
        error!(logger, "Code: {}", 500);

        logger.finalize().unwrap();

        assert_eq!(
            memory.messages(),
            vec!["Formatted: 42", "Items: 100", "Count: 5", "Retry 1 of 3", "Code: 500"]
        );
        let levels: Vec<LogLevel> = memory.entries().iter().map(|e| e.level).collect();
        assert_eq!(
            levels,
            vec![
                LogLevel::Info,
                LogLevel::Info,
                LogLevel::Debug,
                LogLevel::Warn,
                LogLevel::Error
            ]
        );
    }

    #[test]
    fn test_macros_after_finalize_do_not_panic() {
        let logger = Logger::new("macros", vec![]);
        logger.finalize().unwrap();
        info!(logger, "dropped silently");
    }
}
