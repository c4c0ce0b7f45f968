//! Network appender for remote logging
//!
//! Sends newline-delimited text lines to a remote server over TCP.

use crate::core::{Appender, AppenderQueue, ListenerContext, LogEntry, LoggerError, Result};
use parking_lot::Mutex;
use std::io::Write;
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

const WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Network appender that sends logs to a remote TCP server
///
/// # Example
///
/// ```no_run
/// use rust_dispatch_logger::appenders::NetworkAppender;
/// use rust_dispatch_logger::prelude::*;
///
/// let appender = NetworkAppender::new("127.0.0.1:8080")
///     .expect("Failed to connect to log server");
///
/// let logger = Logger::new("app", vec![Box::new(appender)]);
/// logger.info("This log will be sent to 127.0.0.1:8080").unwrap();
/// logger.finalize().unwrap();
/// ```
pub struct NetworkAppender {
    stream: Mutex<Option<TcpStream>>,
    address: String,
    reconnect_on_error: bool,
    queue: AppenderQueue,
}

impl NetworkAppender {
    /// Connect to `addr` (e.g. "localhost:8080")
    pub fn new(addr: impl ToSocketAddrs + ToString) -> Result<Self> {
        let address = addr.to_string();
        let stream = Self::connect(&address)?;

        Ok(Self {
            stream: Mutex::new(Some(stream)),
            address,
            reconnect_on_error: true,
            queue: AppenderQueue::default(),
        })
    }

    /// Enable or disable one reconnect attempt after a failed write
    ///
    /// Default: enabled
    #[must_use]
    pub fn with_reconnect(mut self, enable: bool) -> Self {
        self.reconnect_on_error = enable;
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    fn connect(address: &str) -> Result<TcpStream> {
        let stream = TcpStream::connect(address).map_err(|e| {
            LoggerError::io_operation("connecting to log server", address.to_string(), e)
        })?;
        stream.set_write_timeout(Some(WRITE_TIMEOUT))?;
        stream.set_nodelay(true)?;
        Ok(stream)
    }

    fn send(&self, entry: &LogEntry) -> Result<()> {
        let mut line = entry.to_line();
        line.push('\n');

        let mut stream = self.stream.lock();
        let result = match stream.as_mut() {
            Some(s) => s.write_all(line.as_bytes()),
            None if self.reconnect_on_error => {
                Err(std::io::Error::from(std::io::ErrorKind::NotConnected))
            }
            None => return Err(LoggerError::writer("Network stream not connected")),
        };

        let Err(e) = result else {
            return Ok(());
        };
        *stream = None;

        if !self.reconnect_on_error {
            return Err(e.into());
        }

        match Self::connect(&self.address) {
            Ok(mut fresh) => {
                fresh.write_all(line.as_bytes())?;
                *stream = Some(fresh);
                Ok(())
            }
            Err(reconnect_err) => Err(LoggerError::writer(format!(
                "Failed to send log and reconnect: {} (reconnect: {})",
                e, reconnect_err
            ))),
        }
    }

    fn flush(&self) -> Result<()> {
        if let Some(ref mut stream) = *self.stream.lock() {
            stream.flush()?;
        }
        Ok(())
    }
}

impl Appender for NetworkAppender {
    fn name(&self) -> &str {
        "network"
    }

    fn append(&self, entry: Arc<LogEntry>) {
        self.queue.push(entry);
    }

    fn start_listening(&self, ctx: ListenerContext) {
        self.queue
            .listen(self.name(), ctx, |entry| self.send(entry), || self.flush());
    }

    fn finalize(&self) {
        self.queue.close();
    }
}
