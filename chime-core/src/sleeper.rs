//! Blocking waits that an interrupt can cut short.

use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};

/// What the caller should do after a wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Interrupted,
}

/// Source of real-time delays for playback.
pub trait Sleeper {
    fn sleep(&mut self, duration: Duration) -> Flow;

    /// Non-blocking check for an interrupt that arrived outside any wait.
    fn is_interrupted(&mut self) -> bool {
        false
    }
}

/// Create a linked trigger/signal pair.
pub fn shutdown_channel() -> (ShutdownTrigger, ShutdownSignal) {
    let (tx, rx) = crossbeam_channel::bounded(1);
    (
        ShutdownTrigger { tx },
        ShutdownSignal {
            rx,
            tripped: false,
        },
    )
}

/// Cloneable sender side, safe to call from a signal handler thread.
#[derive(Debug, Clone)]
pub struct ShutdownTrigger {
    tx: Sender<()>,
}

impl ShutdownTrigger {
    pub fn trigger(&self) {
        match self.tx.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) => {}
            Err(TrySendError::Disconnected(())) => {
                log::debug!(target: "session", "shutdown requested after signal dropped")
            }
        }
    }
}

/// Sleeper that wakes early once the trigger fires. Stays tripped afterwards.
#[derive(Debug)]
pub struct ShutdownSignal {
    rx: Receiver<()>,
    tripped: bool,
}

impl Sleeper for ShutdownSignal {
    fn sleep(&mut self, duration: Duration) -> Flow {
        if self.tripped {
            return Flow::Interrupted;
        }
        match self.rx.recv_timeout(duration) {
            Ok(()) => {
                self.tripped = true;
                Flow::Interrupted
            }
            Err(RecvTimeoutError::Timeout) => Flow::Continue,
            Err(RecvTimeoutError::Disconnected) => {
                // Nobody can interrupt any more; fall back to a plain wait.
                thread::sleep(duration);
                Flow::Continue
            }
        }
    }

    fn is_interrupted(&mut self) -> bool {
        if !self.tripped && self.rx.try_recv().is_ok() {
            self.tripped = true;
        }
        self.tripped
    }
}
