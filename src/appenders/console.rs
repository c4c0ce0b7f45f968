//! Console appender implementation

use crate::core::{
    Appender, AppenderQueue, ChannelCapacity, ListenerContext, LogEntry, LogLevel, Result,
};
use colored::Colorize;
use std::io::Write;
use std::sync::Arc;

pub struct ConsoleAppender {
    use_colors: bool,
    queue: AppenderQueue,
}

impl ConsoleAppender {
    pub fn new() -> Self {
        Self::with_colors(true)
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            use_colors,
            queue: AppenderQueue::default(),
        }
    }

    /// Set the capacity of this appender's private queue
    ///
    /// # Example
    ///
    /// ```
    /// use rust_dispatch_logger::appenders::ConsoleAppender;
    /// use rust_dispatch_logger::ChannelCapacity;
    ///
    /// let appender = ConsoleAppender::new()
    ///     .with_capacity(ChannelCapacity::Bounded(64));
    /// ```
    #[must_use]
    pub fn with_capacity(mut self, capacity: ChannelCapacity) -> Self {
        self.queue = AppenderQueue::new(capacity);
        self
    }

    /// Format as text with optional colors
    fn format_text(&self, entry: &LogEntry) -> String {
        let level_str = if self.use_colors {
            format!("{:5}", entry.level.to_str())
                .color(entry.level.color_code())
                .to_string()
        } else {
            format!("{:5}", entry.level.to_str())
        };

        format!(
            "[{}] [{}] {} - {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            level_str,
            entry.thread_label(),
            entry.escaped_message()
        )
    }

    fn write(&self, entry: &LogEntry) -> Result<()> {
        let output = self.format_text(entry);

        // Errors go to stderr, everything else to stdout
        match entry.level {
            LogLevel::Error => writeln!(std::io::stderr().lock(), "{}", output)?,
            _ => writeln!(std::io::stdout().lock(), "{}", output)?,
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::new()
    }
}

impl Appender for ConsoleAppender {
    fn name(&self) -> &str {
        "console"
    }

    fn append(&self, entry: Arc<LogEntry>) {
        self.queue.push(entry);
    }

    fn start_listening(&self, ctx: ListenerContext) {
        self.queue
            .listen(self.name(), ctx, |entry| self.write(entry), || self.flush());
    }

    fn finalize(&self) {
        self.queue.close();
    }
}
