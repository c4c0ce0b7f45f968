//! Core logger types and traits

pub mod appender;
pub mod appender_queue;
pub mod config;
mod dispatcher;
pub mod error;
mod isolation;
pub mod listener;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod overflow_policy;
mod registry;
pub mod signal;
pub mod tracker;

pub use appender::Appender;
pub use appender_queue::AppenderQueue;
pub use config::{ChannelCapacity, LoggerConfig, DEFAULT_QUEUE_CAPACITY};
pub use error::{LoggerError, Result};
pub use listener::{AppenderErrorHandler, ListenerContext};
pub use log_entry::LogEntry;
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerBuilder, LoggerState, DEFAULT_SHUTDOWN_TIMEOUT};
pub use metrics::LoggerMetrics;
pub use overflow_policy::{OverflowCallback, OverflowPolicy};
pub use signal::ShutdownSignal;
pub use tracker::{CompletionGuard, TaskTracker};
