//! Error types for the logger system

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Submission or registration after finalize has begun
    #[error("Logger is closed: finalize has already begun")]
    Closed,

    /// Submission channel full under the reject policy
    #[error("Log queue full: capacity {capacity} reached")]
    QueueFull { capacity: usize },

    /// Listener tasks still running when the shutdown budget ran out
    #[error("Shutdown timed out with {pending} task(s) still running")]
    ShutdownTimeout { pending: usize },

    /// Failure reported by a single appender while rendering
    #[error("Appender '{appender}' failed: {message}")]
    AppenderFailure { appender: String, message: String },

    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// A listener or dispatcher thread could not be started
    #[error("Failed to spawn thread '{thread}': {source}")]
    ThreadSpawn {
        thread: String,
        #[source]
        source: std::io::Error,
    },

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    WriterError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    pub fn queue_full(capacity: usize) -> Self {
        LoggerError::QueueFull { capacity }
    }

    pub fn shutdown_timeout(pending: usize) -> Self {
        LoggerError::ShutdownTimeout { pending }
    }

    /// Create an appender failure error
    pub fn appender(appender: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::AppenderFailure {
            appender: appender.into(),
            message: message.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    pub fn thread_spawn(thread: impl Into<String>, source: std::io::Error) -> Self {
        LoggerError::ThreadSpawn {
            thread: thread.into(),
            source,
        }
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::WriterError(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }

    /// Whether this error means the logger no longer accepts work
    pub fn is_closed(&self) -> bool {
        matches!(self, LoggerError::Closed)
    }
}
