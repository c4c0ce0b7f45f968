//! # Rust Dispatch Logger
//!
//! An in-process asynchronous logging facility. Callers submit messages to
//! a [`Logger`]; a dedicated dispatcher thread fans each message out, in
//! registration order, to every registered [`Appender`]. Each appender owns
//! a private queue and a listener thread that performs the actual output.
//!
//! ## Features
//!
//! - **Off the critical path**: `log` returns once the dispatcher accepted the message
//! - **Ordered fan-out**: every appender sees messages in submission order
//! - **Pluggable appenders**: console, file, JSON, network, in-memory, or your own
//! - **Coordinated shutdown**: `finalize` is idempotent and never deadlocks on a second call
//!
//! ```
//! use rust_dispatch_logger::prelude::*;
//!
//! let memory = MemoryAppender::new();
//! let logger = Logger::new("app", vec![]);
//! logger.add_appender(Box::new(memory.clone())).unwrap();
//!
//! logger.log(LogLevel::Info, "hello").unwrap();
//! logger.finalize().unwrap();
//!
//! assert_eq!(memory.messages(), vec!["hello"]);
//! ```

pub mod appenders;
pub mod core;
pub mod macros;

pub mod prelude {
    #[cfg(feature = "console")]
    pub use crate::appenders::ConsoleAppender;
    #[cfg(feature = "file")]
    pub use crate::appenders::{FileAppender, JsonAppender};
    pub use crate::appenders::MemoryAppender;
    pub use crate::core::{
        Appender, AppenderErrorHandler, AppenderQueue, ChannelCapacity, ListenerContext,
        LogEntry, LogLevel, Logger, LoggerBuilder, LoggerConfig, LoggerError, LoggerMetrics,
        LoggerState, OverflowCallback, OverflowPolicy, Result, DEFAULT_SHUTDOWN_TIMEOUT,
    };
}

#[cfg(feature = "console")]
pub use appenders::ConsoleAppender;
#[cfg(feature = "file")]
pub use appenders::{FileAppender, JsonAppender};
pub use appenders::MemoryAppender;
pub use core::{
    Appender, AppenderErrorHandler, AppenderQueue, ChannelCapacity, CompletionGuard,
    ListenerContext, LogEntry, LogLevel, Logger, LoggerBuilder, LoggerConfig, LoggerError,
    LoggerMetrics, LoggerState, OverflowCallback, OverflowPolicy, Result, ShutdownSignal,
    TaskTracker, DEFAULT_QUEUE_CAPACITY, DEFAULT_SHUTDOWN_TIMEOUT,
};
