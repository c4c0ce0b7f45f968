//! Log entry structure

use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cell::RefCell;

// Thread-local caches for thread information to avoid repeated allocations
thread_local! {
    static THREAD_ID_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
    static THREAD_NAME_CACHE: RefCell<Option<Option<String>>> = const { RefCell::new(None) };
}

fn get_thread_id() -> String {
    THREAD_ID_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| format!("{:?}", std::thread::current().id()))
            .clone()
    })
}

fn get_thread_name() -> Option<String> {
    THREAD_NAME_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| std::thread::current().name().map(String::from))
            .clone()
    })
}

/// An immutable log message, captured on the submitting thread.
///
/// Once handed to the logger the entry is shared between appenders
/// through an `Arc` and never mutated again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub thread_id: String,
    pub thread_name: Option<String>,
}

impl LogEntry {
    /// Capture `message` as submitted, together with the calling thread.
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Utc::now(),
            thread_id: get_thread_id(),
            thread_name: get_thread_name(),
        }
    }

    /// Name of the submitting thread, or its id when unnamed
    pub fn thread_label(&self) -> &str {
        self.thread_name.as_deref().unwrap_or(&self.thread_id)
    }

    /// The message with newlines, carriage returns, tabs and backslashes
    /// escaped, so it cannot break out of a single text line.
    ///
    /// Backslashes are escaped too, which keeps distinct messages distinct
    /// after escaping.
    pub fn escaped_message(&self) -> Cow<'_, str> {
        if !self.message.contains(|c: char| matches!(c, '\\' | '\n' | '\r' | '\t')) {
            return Cow::Borrowed(&self.message);
        }

        let mut escaped = String::with_capacity(self.message.len() + 8);
        for c in self.message.chars() {
            match c {
                '\\' => escaped.push_str("\\\\"),
                '\n' => escaped.push_str("\\n"),
                '\r' => escaped.push_str("\\r"),
                '\t' => escaped.push_str("\\t"),
                _ => escaped.push(c),
            }
        }
        Cow::Owned(escaped)
    }

    /// Render as a single text line (without the trailing newline)
    pub fn to_line(&self) -> String {
        format!(
            "[{}] [{:5}] [{}] {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            self.level.to_str(),
            self.thread_label(),
            self.escaped_message()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_is_kept_verbatim() {
        let entry = LogEntry::new(LogLevel::Info, "one\ntwo\rthree\tfour");
        assert_eq!(entry.message, "one\ntwo\rthree\tfour");
        assert_eq!(entry.escaped_message(), "one\\ntwo\\rthree\\tfour");
        assert_eq!(entry.to_line().lines().count(), 1);
    }

    #[test]
    fn test_escaping_keeps_distinct_messages_distinct() {
        let newline = LogEntry::new(LogLevel::Info, "a\nb");
        let backslash_n = LogEntry::new(LogLevel::Info, "a\\nb");

        assert_ne!(newline.escaped_message(), backslash_n.escaped_message());
        assert_eq!(backslash_n.escaped_message(), "a\\\\nb");
    }

    #[test]
    fn test_plain_message_is_borrowed() {
        let entry = LogEntry::new(LogLevel::Debug, "nothing to escape");
        assert!(matches!(entry.escaped_message(), Cow::Borrowed(_)));
    }

    #[test]
    fn test_to_line_layout() {
        let entry = LogEntry::new(LogLevel::Warn, "disk almost full");
        let line = entry.to_line();
        assert!(line.contains("[WARN ]"));
        assert!(line.ends_with("disk almost full"));
        assert!(line.contains(entry.thread_label()));
    }

    #[test]
    fn test_thread_label_falls_back_to_id() {
        let entry = std::thread::Builder::new()
            .spawn(|| LogEntry::new(LogLevel::Debug, "unnamed"))
            .unwrap()
            .join()
            .unwrap();
        assert!(entry.thread_name.is_none());
        assert_eq!(entry.thread_label(), entry.thread_id);
    }
}
