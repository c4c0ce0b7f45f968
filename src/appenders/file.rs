//! File appender implementation

use crate::core::{
    Appender, AppenderQueue, ChannelCapacity, ListenerContext, LogEntry, LoggerError, Result,
};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Appends one text line per entry to a file.
///
/// Writes are buffered and flushed whenever the queue runs dry, and once
/// more when the appender is finalized.
pub struct FileAppender {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
    queue: AppenderQueue,
}

impl FileAppender {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                LoggerError::io_operation(
                    "opening log file",
                    format!("cannot open '{}'", path.display()),
                    e,
                )
            })?;

        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
            queue: AppenderQueue::default(),
        })
    }

    /// Set the capacity of this appender's private queue
    #[must_use]
    pub fn with_capacity(mut self, capacity: ChannelCapacity) -> Self {
        self.queue = AppenderQueue::new(capacity);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, entry: &LogEntry) -> Result<()> {
        let mut writer = self.writer.lock();
        writeln!(writer, "{}", entry.to_line())?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.writer.lock().flush()?;
        Ok(())
    }
}

impl Appender for FileAppender {
    fn name(&self) -> &str {
        "file"
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

impl Drop for FileAppender {
    fn drop(&mut self) {
        // Ensure all buffered data is flushed to disk
        let _ = self.flush();
    }
}
