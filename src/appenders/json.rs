//! JSON appender for structured output
//!
//! Writes each entry as a single-line JSON object (JSONL), compatible with
//! log aggregation tools like ELK or Loki.

use crate::core::{Appender, AppenderQueue, ListenerContext, LogEntry, Result};
use parking_lot::Mutex;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

#[derive(Serialize)]
struct JsonRecord<'a> {
    timestamp: String,
    level: &'a str,
    thread: &'a str,
    message: &'a str,
}

impl<'a> From<&'a LogEntry> for JsonRecord<'a> {
    fn from(entry: &'a LogEntry) -> Self {
        Self {
            timestamp: entry.timestamp.to_rfc3339(),
            level: entry.level.to_str(),
            thread: entry.thread_label(),
            message: &entry.message,
        }
    }
}

pub struct JsonAppender {
    writer: Mutex<BufWriter<File>>,
    pretty: bool,
    queue: AppenderQueue,
}

impl JsonAppender {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open(path, false)
    }

    /// Pretty-printed output; one entry then spans several lines
    pub fn new_pretty<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open(path, true)
    }

    fn open<P: AsRef<Path>>(path: P, pretty: bool) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            pretty,
            queue: AppenderQueue::default(),
        })
    }

    fn write(&self, entry: &LogEntry) -> Result<()> {
        let record = JsonRecord::from(entry);
        let json = if self.pretty {
            serde_json::to_string_pretty(&record)?
        } else {
            serde_json::to_string(&record)?
        };

        writeln!(self.writer.lock(), "{}", json)?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.writer.lock().flush()?;
        Ok(())
    }
}

impl Appender for JsonAppender {
    fn name(&self) -> &str {
        "json"
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
