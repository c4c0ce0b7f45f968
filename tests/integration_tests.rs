//! Integration tests for the logger system
//!
//! These tests verify:
//! - Delivery order and exactly-once fan-out
//! - Registration before and after construction
//! - Bounded, idempotent shutdown
//! - Isolation of failing and panicking appenders
//! - File and JSON output end to end

use crossbeam_channel::bounded;
use parking_lot::Mutex;
use rust_dispatch_logger::prelude::*;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

const WAIT: Duration = Duration::from_secs(5);

/// Run `finalize` on another thread and fail the test if it does not
/// return within `budget`.
fn finalize_within(logger: Arc<Logger>, budget: Duration) -> Result<()> {
    let (done_tx, done_rx) = bounded(1);
    thread::spawn(move || {
        let _ = done_tx.send(logger.finalize());
    });
    done_rx
        .recv_timeout(budget)
        .expect("finalize did not return within the time budget")
}

#[test]
fn test_add_appender_then_log_hello() {
    let logger = Logger::new("scenario", vec![]);
    let memory = MemoryAppender::new();
    logger.add_appender(Box::new(memory.clone())).unwrap();

    logger.log(LogLevel::Info, "hello").unwrap();

    assert!(memory.wait_for(1, WAIT));
    assert_eq!(memory.messages(), vec!["hello"]);

    finalize_within(Arc::new(logger), WAIT).unwrap();
    assert_eq!(memory.messages(), vec!["hello"]);
}

#[test]
fn test_two_appenders_receive_same_sequence() {
    let first = MemoryAppender::named("first");
    let second = MemoryAppender::named("second");
    let logger = Logger::new(
        "scenario",
        vec![Box::new(first.clone()), Box::new(second.clone())],
    );

    for message in ["a", "b", "c"] {
        logger.info(message).unwrap();
    }
    logger.finalize().unwrap();

    assert_eq!(first.messages(), vec!["a", "b", "c"]);
    assert_eq!(second.messages(), vec!["a", "b", "c"]);
}

#[test]
fn test_n_appenders_each_see_message_exactly_once() {
    let appenders: Vec<MemoryAppender> = (0..8)
        .map(|i| MemoryAppender::named(format!("memory-{}", i)))
        .collect();
    let logger = Logger::new(
        "fan-out",
        appenders
            .iter()
            .map(|a| Box::new(a.clone()) as Box<dyn Appender>)
            .collect(),
    );

    logger.warn("once").unwrap();
    logger.finalize().unwrap();

    for appender in &appenders {
        assert_eq!(appender.messages(), vec!["once"], "appender {}", appender.name());
    }
}

#[test]
fn test_levels_are_carried_not_filtered() {
    let memory = MemoryAppender::new();
    let logger = Logger::new("levels", vec![Box::new(memory.clone())]);

    for level in LogLevel::ALL {
        logger.log(level, level.to_str()).unwrap();
    }
    logger.finalize().unwrap();

    let levels: Vec<LogLevel> = memory.entries().iter().map(|e| e.level).collect();
    assert_eq!(levels, LogLevel::ALL.to_vec());
}

#[test]
fn test_finalize_returns_within_budget() {
    let appenders: Vec<Box<dyn Appender>> = (0..4)
        .map(|i| Box::new(MemoryAppender::named(format!("m{}", i))) as Box<dyn Appender>)
        .collect();
    let logger = Arc::new(Logger::new("bounded", appenders));
    for i in 0..100 {
        logger.info(format!("message {}", i)).unwrap();
    }

    let start = Instant::now();
    finalize_within(Arc::clone(&logger), WAIT).unwrap();
    assert!(start.elapsed() < WAIT);

    // Every listener reported completion
    assert_eq!(logger.outstanding_tasks(), 0);
    assert_eq!(logger.state(), LoggerState::Finalized);
}

#[test]
fn test_finalize_twice_does_not_deadlock() {
    let memory = MemoryAppender::new();
    let logger = Arc::new(Logger::new("twice", vec![Box::new(memory.clone())]));
    logger.info("before").unwrap();

    finalize_within(Arc::clone(&logger), WAIT).unwrap();
    finalize_within(Arc::clone(&logger), WAIT).unwrap();

    assert_eq!(memory.messages(), vec!["before"]);
}

#[test]
fn test_concurrent_finalize_calls() {
    let logger = Arc::new(Logger::new("racing", vec![Box::new(MemoryAppender::new())]));

    let (done_tx, done_rx) = bounded(4);
    for _ in 0..4 {
        let logger = Arc::clone(&logger);
        let done_tx = done_tx.clone();
        thread::spawn(move || {
            let _ = done_tx.send(logger.finalize());
        });
    }

    for _ in 0..4 {
        done_rx.recv_timeout(WAIT).expect("finalize hung").unwrap();
    }
    assert_eq!(logger.outstanding_tasks(), 0);
}

#[test]
fn test_operations_after_finalize_are_rejected() {
    let logger = Logger::new("closed", vec![]);
    logger.finalize().unwrap();

    assert!(matches!(logger.info("late"), Err(LoggerError::Closed)));
    assert!(matches!(
        logger.add_appender(Box::new(MemoryAppender::new())),
        Err(LoggerError::Closed)
    ));
    assert_eq!(logger.appender_count(), 0);
}

#[test]
fn test_failing_appender_is_isolated() {
    struct FailingAppender {
        queue: AppenderQueue,
        attempts: AtomicUsize,
    }

    impl Appender for FailingAppender {
        fn name(&self) -> &str {
            "failing"
        }

        fn append(&self, entry: Arc<LogEntry>) {
            self.queue.push(entry);
        }

        fn start_listening(&self, ctx: ListenerContext) {
            self.queue.listen(
                self.name(),
                ctx,
                |_| {
                    self.attempts.fetch_add(1, Ordering::Relaxed);
                    Err(LoggerError::writer("Simulated failure"))
                },
                || Ok(()),
            );
        }

        fn finalize(&self) {
            self.queue.close();
        }
    }

    let failures = Arc::new(Mutex::new(Vec::new()));
    let failures_clone = Arc::clone(&failures);
    let failing = Arc::new(FailingAppender {
        queue: AppenderQueue::default(),
        attempts: AtomicUsize::new(0),
    });
    let healthy = MemoryAppender::new();

    let logger = Logger::builder()
        .shared_appender(failing.clone())
        .appender(healthy.clone())
        .on_appender_error(Arc::new(move |name: &str, err: &LoggerError| {
            failures_clone.lock().push(format!("{}: {}", name, err));
        }))
        .build();

    for i in 0..5 {
        logger.info(format!("message {}", i)).unwrap();
    }
    logger.finalize().unwrap();

    assert_eq!(failing.attempts.load(Ordering::Relaxed), 5);
    assert_eq!(healthy.len(), 5);
    assert_eq!(logger.metrics().appender_failures(), 5);
    assert_eq!(failures.lock().len(), 5);
    assert_eq!(failures.lock()[0], "failing: Writer error: Simulated failure");
}

#[test]
fn test_panicking_append_does_not_stop_fan_out() {
    struct PanickingAppender;

    impl Appender for PanickingAppender {
        fn name(&self) -> &str {
            "panicking"
        }

        fn append(&self, _entry: Arc<LogEntry>) {
            panic!("append exploded");
        }

        fn start_listening(&self, _ctx: ListenerContext) {}

        fn finalize(&self) {}
    }

    let healthy = MemoryAppender::new();
    let logger = Logger::new(
        "panics",
        vec![Box::new(PanickingAppender), Box::new(healthy.clone())],
    );

    logger.info("still delivered").unwrap();
    logger.finalize().unwrap();

    assert_eq!(healthy.messages(), vec!["still delivered"]);
    assert_eq!(logger.metrics().appender_failures(), 1);
}

#[test]
fn test_appender_added_while_running_sees_only_later_messages() {
    let early = MemoryAppender::named("early");
    let late = MemoryAppender::named("late");
    let logger = Logger::new("growing", vec![Box::new(early.clone())]);

    logger.info("before").unwrap();
    assert!(early.wait_for(1, WAIT));

    logger.add_appender(Box::new(late.clone())).unwrap();
    logger.info("after").unwrap();
    logger.finalize().unwrap();

    assert_eq!(early.messages(), vec!["before", "after"]);
    assert_eq!(late.messages(), vec!["after"]);
    assert_eq!(logger.appender_names(), vec!["early", "late"]);
}

#[test]
fn test_rendezvous_channel_delivers_everything() {
    let memory = MemoryAppender::with_capacity(ChannelCapacity::Rendezvous);
    let logger = Logger::builder()
        .capacity(ChannelCapacity::Rendezvous)
        .appender(memory.clone())
        .build();

    for i in 0..20 {
        logger.info(format!("message {}", i)).unwrap();
    }
    logger.finalize().unwrap();

    let expected: Vec<String> = (0..20).map(|i| format!("message {}", i)).collect();
    assert_eq!(memory.messages(), expected);
}

#[test]
fn test_builder_from_config() {
    let config = LoggerConfig::from_json(
        r#"{ "name": "configured", "capacity": "unbounded", "shutdown_timeout_ms": 2000 }"#,
    )
    .unwrap();
    let memory = MemoryAppender::new();
    let logger = LoggerBuilder::from_config(&config)
        .appender(memory.clone())
        .build();

    assert_eq!(logger.name(), "configured");
    assert_eq!(logger.capacity(), ChannelCapacity::Unbounded);

    logger.info("configured message").unwrap();
    logger.finalize().unwrap();
    assert_eq!(memory.messages(), vec!["configured message"]);
}

#[test]
fn test_log_injection_prevention() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("injection_test.log");

    let logger = Logger::new(
        "files",
        vec![Box::new(FileAppender::new(&log_file).expect("Failed to create appender"))],
    );

    let malicious_message = "User login\nERROR [2024-10-17] Fake error injected\nINFO Continuation";
    logger.info(malicious_message).unwrap();
    logger.finalize().unwrap();

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    assert!(content.contains("User login\\nERROR [2024-10-17] Fake error injected\\nINFO Continuation"));
    assert_eq!(content.lines().count(), 1, "Log should be a single line");
}

#[test]
fn test_messages_reach_appenders_as_submitted() {
    let memory = MemoryAppender::new();
    let logger = Logger::new("verbatim", vec![Box::new(memory.clone())]);

    logger.info("a\nb").unwrap();
    logger.info("a\\nb").unwrap();
    logger.info("tab\there").unwrap();
    logger.finalize().unwrap();

    assert_eq!(memory.messages(), vec!["a\nb", "a\\nb", "tab\there"]);
}

#[test]
fn test_file_and_json_appenders_end_to_end() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let text_file = temp_dir.path().join("app.log");
    let json_file = temp_dir.path().join("app.jsonl");

    let logger = Logger::builder()
        .name("outputs")
        .appender(FileAppender::new(&text_file).unwrap())
        .appender(JsonAppender::new(&json_file).unwrap())
        .build();

    for i in 0..50 {
        logger.log(LogLevel::Debug, format!("Message {}", i)).unwrap();
    }
    logger.finalize().unwrap();

    let text = fs::read_to_string(&text_file).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 50);
    assert!(lines[49].ends_with("Message 49"));

    let json = fs::read_to_string(&json_file).unwrap();
    let messages: Vec<String> = json
        .lines()
        .map(|line| {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            value["message"].as_str().unwrap().to_string()
        })
        .collect();
    let expected: Vec<String> = (0..50).map(|i| format!("Message {}", i)).collect();
    assert_eq!(messages, expected);
}

#[test]
fn test_block_policy_back_pressures_without_loss() {
    let memory = MemoryAppender::with_capacity(ChannelCapacity::Bounded(2));
    let logger = Logger::builder()
        .capacity(ChannelCapacity::Bounded(2))
        .overflow_policy(OverflowPolicy::Block)
        .appender(memory.clone())
        .build();

    for i in 0..500 {
        logger.info(format!("Message {}", i)).unwrap();
    }
    logger.finalize().unwrap();

    assert_eq!(memory.len(), 500);
    assert_eq!(logger.dropped_count(), 0);
    assert_eq!(logger.metrics().submitted(), 500);
    assert_eq!(logger.metrics().dispatched(), 500);
}
