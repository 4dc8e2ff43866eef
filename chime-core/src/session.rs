//! The play / pause / repeat loop and its teardown.

use std::io::Write;
use std::time::Duration;

use chime_types::{IndicatorMap, Melody, Pin, Tempo};

use crate::board::Board;
use crate::firmata::{InboundMessage, PinMode};
use crate::sequencer::{play_melody, PlayOutcome};
use crate::sleeper::{Flow, Sleeper};
use crate::ChimeResult;

/// Everything the loop needs to know about what to play.
#[derive(Debug, Clone)]
pub struct PlaybackPlan {
    pub melody: Melody,
    pub tempo: Tempo,
    pub speaker: Pin,
    pub indicators: IndicatorMap,
    /// Silence between two passes of the melody.
    pub repeat_pause: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub passes_completed: u32,
}

/// A board plus the plan it plays.
///
/// Teardown (every indicator driven low) runs exactly once: on
/// [`Session::close`], or on drop if `close` was never reached.
pub struct Session<W: Write> {
    board: Board<W>,
    plan: PlaybackPlan,
    torn_down: bool,
    reader_gone_logged: bool,
}

impl<W: Write> Session<W> {
    pub fn new(board: Board<W>, plan: PlaybackPlan) -> Self {
        Self {
            board,
            plan,
            torn_down: false,
            reader_gone_logged: false,
        }
    }

    pub fn plan(&self) -> &PlaybackPlan {
        &self.plan
    }

    pub fn board(&self) -> &Board<W> {
        &self.board
    }

    /// Put every indicator pin in OUTPUT mode.
    pub fn prepare(&mut self) -> ChimeResult {
        for pin in self.plan.indicators.pins() {
            self.board.set_pin_mode(pin, PinMode::Output)?;
        }
        Ok(())
    }

    /// Play, pause, repeat until `sleeper` reports an interrupt.
    ///
    /// The interrupt is checked before every pass, so a stop requested
    /// before `run` plays nothing. Inbound board messages are logged between
    /// passes. A transport error ends the loop; teardown is left to `close`
    /// or drop.
    pub fn run<S: Sleeper>(&mut self, sleeper: &mut S) -> ChimeResult<RunSummary> {
        let mut summary = RunSummary::default();
        loop {
            self.log_inbound();
            // catches a Ctrl+C queued during the settle delay
            if sleeper.is_interrupted() {
                log::info!(target: "session", "🎵 playback interrupted");
                return Ok(summary);
            }
            let outcome = play_melody(
                &mut self.board,
                self.plan.speaker,
                &self.plan.melody,
                self.plan.tempo,
                &self.plan.indicators,
                sleeper,
            )?;
            if outcome == PlayOutcome::Interrupted {
                log::info!(target: "session", "🎵 playback interrupted");
                return Ok(summary);
            }
            summary.passes_completed += 1;

            if sleeper.sleep(self.plan.repeat_pause) == Flow::Interrupted {
                log::info!(target: "session", "🎵 playback interrupted");
                return Ok(summary);
            }
        }
    }

    /// Drive every indicator low. Later calls do nothing.
    ///
    /// Each pin is attempted once even if an earlier write fails; the first
    /// error is returned.
    pub fn teardown(&mut self) -> ChimeResult {
        if self.torn_down {
            return Ok(());
        }
        self.torn_down = true;

        let mut first_error = None;
        for pin in self.plan.indicators.pins() {
            if let Err(e) = self.board.digital_write(pin, false) {
                log::warn!(target: "session", "could not clear indicator {}: {}", pin, e);
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Tear down, then release the transport.
    pub fn close(mut self) -> ChimeResult {
        let result = self.teardown();
        log::info!(target: "session", "🔌 connection closed");
        result
    }

    fn log_inbound(&mut self) {
        for message in self.board.poll_inbound() {
            match message {
                InboundMessage::FirmwareReport { major, minor, name } => {
                    log::info!(target: "session", "firmware {} {}.{}", name, major, minor)
                }
                InboundMessage::ProtocolVersion { major, minor } => {
                    log::info!(target: "session", "firmata protocol {}.{}", major, minor)
                }
                InboundMessage::StringData(text) => {
                    log::info!(target: "session", "board says: {}", text)
                }
                other => log::debug!(target: "session", "inbound {:?}", other),
            }
        }
        if self.board.inbound_closed() && !self.reader_gone_logged {
            log::warn!(target: "session", "board stopped replying; inbound reader has exited");
            self.reader_gone_logged = true;
        }
    }
}

impl<W: Write> Drop for Session<W> {
    fn drop(&mut self) {
        if let Err(e) = self.teardown() {
            log::warn!(target: "session", "teardown on drop failed: {}", e);
        }
    }
}

/// Prepare, run until interrupted, and always tear down and close.
///
/// The first error wins: a run error is returned even if teardown also fails.
pub fn run_session<W: Write, S: Sleeper>(
    board: Board<W>,
    plan: PlaybackPlan,
    sleeper: &mut S,
) -> ChimeResult<RunSummary> {
    let mut session = Session::new(board, plan);
    let result = session.prepare().and_then(|()| session.run(sleeper));
    let closed = session.close();
    let summary = result?;
    closed?;
    Ok(summary)
}
