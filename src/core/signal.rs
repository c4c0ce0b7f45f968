//! Closeable termination signal
//!
//! A [`ShutdownSignal`] is triggered by dropping the only sender of a
//! zero-sized channel. Every clone of the receiver then observes a
//! disconnect, any number of times, so triggering is idempotent and the
//! signal can be awaited from `select!` alongside a message channel.

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct ShutdownSignal {
    trigger: Arc<Mutex<Option<Sender<()>>>>,
    receiver: Receiver<()>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (sender, receiver) = bounded(0);
        Self {
            trigger: Arc::new(Mutex::new(Some(sender))),
            receiver,
        }
    }

    /// Fire the signal. Returns `true` only for the call that fired it.
    pub fn trigger(&self) -> bool {
        self.trigger.lock().take().is_some()
    }

    pub fn is_triggered(&self) -> bool {
        self.trigger.lock().is_none()
    }

    /// Receiver that becomes ready (disconnected) once the signal fires.
    ///
    /// Nothing is ever sent on it; select on it and treat any
    /// completion as termination.
    pub fn receiver(&self) -> &Receiver<()> {
        &self.receiver
    }

    /// Block until the signal fires.
    pub fn wait(&self) {
        let _ = self.receiver.recv();
    }

    /// Block until the signal fires or `timeout` elapses.
    ///
    /// Returns `true` if the signal fired.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        matches!(
            self.receiver.recv_timeout(timeout),
            Err(RecvTimeoutError::Disconnected)
        )
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ShutdownSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutdownSignal")
            .field("triggered", &self.is_triggered())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_trigger_is_idempotent() {
        let signal = ShutdownSignal::new();
        assert!(!signal.is_triggered());
        assert!(signal.trigger());
        assert!(!signal.trigger());
        assert!(signal.is_triggered());
    }

    #[test]
    fn test_broadcast_to_many_waiters() {
        let signal = ShutdownSignal::new();
        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let signal = signal.clone();
                thread::spawn(move || signal.wait())
            })
            .collect();

        signal.trigger();
        for waiter in waiters {
            waiter.join().unwrap();
        }

        // Observable again after the fact
        assert!(signal.wait_timeout(Duration::from_millis(1)));
    }

    #[test]
    fn test_wait_timeout_without_trigger() {
        let signal = ShutdownSignal::new();
        assert!(!signal.wait_timeout(Duration::from_millis(10)));
    }
}
