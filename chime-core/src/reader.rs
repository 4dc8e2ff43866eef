//! Background reader for the board-to-host direction.
//!
//! The board talks back (version reports, firmware name, pin state) whether or
//! not anyone listens. The reader thread drains the port so its OS buffer
//! never fills, parses what arrives, and hands messages to the control thread
//! over a channel. It never writes.

use std::io::{ErrorKind, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Receiver;

use crate::firmata::{FirmataParser, InboundMessage};

pub struct InboundReader {
    messages: Receiver<InboundMessage>,
    stop: Arc<AtomicBool>,
    join_handle: Option<JoinHandle<()>>,
}

impl InboundReader {
    /// Spawn the reader thread over `source`.
    ///
    /// `source` should have a read timeout so the thread notices [`Drop`];
    /// timeouts are not treated as errors. End of stream or a hard read
    /// error ends the thread.
    pub fn spawn<R: Read + Send + 'static>(mut source: R) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);

        let join_handle = thread::spawn(move || {
            let mut parser = FirmataParser::new();
            let mut buf = [0u8; 256];
            while !thread_stop.load(Ordering::Relaxed) {
                match source.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        for message in parser.feed(&buf[..n]) {
                            log::trace!(target: "reader", "{:?}", message);
                            if tx.send(message).is_err() {
                                return;
                            }
                        }
                    }
                    Err(ref e)
                        if matches!(
                            e.kind(),
                            ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
                        ) =>
                    {
                        continue
                    }
                    Err(e) => {
                        log::warn!(target: "reader", "read failed, stopping: {}", e);
                        break;
                    }
                }
            }
            log::debug!(target: "reader", "reader thread exiting");
        });

        Self {
            messages: rx,
            stop,
            join_handle: Some(join_handle),
        }
    }

    /// Every message received so far (non-blocking).
    pub fn drain(&self) -> Vec<InboundMessage> {
        self.messages.try_iter().collect()
    }

    /// The thread has exited: end of stream, a hard read error, or drop.
    /// Messages it sent before exiting are still available to [`drain`].
    ///
    /// [`drain`]: InboundReader::drain
    pub fn is_finished(&self) -> bool {
        self.join_handle
            .as_ref()
            .map_or(true, |handle| handle.is_finished())
    }
}

impl Drop for InboundReader {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.join_handle.take() {
            let _ = handle.join();
        }
    }
}
