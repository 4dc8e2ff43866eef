//! Melody playback: one tone frame and one indicator pulse per note.

use std::io::Write;
use std::time::Duration;

use chime_types::{IndicatorMap, Melody, Note, Pin, Tempo};

use crate::board::Board;
use crate::sleeper::{Flow, Sleeper};
use crate::ChimeResult;

/// How a pass over the melody ended (errors are returned separately).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    Completed,
    Interrupted,
}

/// Timing of one note at a given tempo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteTiming {
    /// Full slot: how long playback blocks on this note.
    pub duration_ms: u32,
    /// How long the buzzer sounds; the rest of the slot is the gap.
    pub sounding_ms: u32,
}

impl NoteTiming {
    pub fn of(note: &Note, tempo: Tempo) -> Self {
        let duration_ms = note.duration_ms(tempo);
        Self {
            duration_ms,
            // 80% of the slot, truncated
            sounding_ms: (duration_ms as u64 * 4 / 5) as u32,
        }
    }
}

/// One resolved step of a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub index: usize,
    pub note: Note,
    pub timing: NoteTiming,
}

/// Cursor over one pass of a melody at a fixed tempo.
///
/// Lives for a single call to [`play_melody`] and is thrown away when the
/// melody is exhausted or playback is interrupted.
#[derive(Debug)]
pub struct PlaybackSession<'m> {
    melody: &'m Melody,
    tempo: Tempo,
    index: usize,
}

impl<'m> PlaybackSession<'m> {
    pub fn new(melody: &'m Melody, tempo: Tempo) -> Self {
        Self {
            melody,
            tempo,
            index: 0,
        }
    }

    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    /// Index of the note the next call to `next` returns.
    pub fn position(&self) -> usize {
        self.index
    }
}

impl Iterator for PlaybackSession<'_> {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        let note = *self.melody.notes().get(self.index)?;
        let step = Step {
            index: self.index,
            note,
            timing: NoteTiming::of(&note, self.tempo),
        };
        self.index += 1;
        Some(step)
    }
}

/// Play every note of `melody` once, in order, blocking for each note's slot.
///
/// For a sounding note: send the tone (80% of the slot), raise the note's
/// indicator if it has one, wait the full slot, lower the indicator. For a
/// rest: just wait. A transport error stops the pass and is returned; an
/// interrupted wait returns `Interrupted` right away and leaves any raised
/// indicator for teardown to clear.
pub fn play_melody<W: Write, S: Sleeper>(
    board: &mut Board<W>,
    speaker: Pin,
    melody: &Melody,
    tempo: Tempo,
    indicators: &IndicatorMap,
    sleeper: &mut S,
) -> ChimeResult<PlayOutcome> {
    log::info!(
        target: "sequencer",
        "🎵 playing '{}' at {} bpm ({} notes, {} ms)",
        melody.name(),
        tempo.bpm(),
        melody.len(),
        melody.duration_ms(tempo)
    );

    for step in PlaybackSession::new(melody, tempo) {
        let Step { note, timing, .. } = step;
        let frequency = note.pitch.frequency_hz();
        let slot = Duration::from_millis(timing.duration_ms as u64);

        if frequency == 0 {
            log::info!(target: "sequencer", "♫ rest - {} beats", note.beats);
            if sleeper.sleep(slot) == Flow::Interrupted {
                return Ok(PlayOutcome::Interrupted);
            }
            continue;
        }

        board.play_tone(speaker, frequency as u32, timing.sounding_ms)?;
        let indicator = indicators.pin_for(note.pitch);
        if let Some(pin) = indicator {
            board.digital_write(pin, true)?;
        }
        log::info!(
            target: "sequencer",
            "♪ {} ({}Hz) - {} beats",
            note.pitch,
            frequency,
            note.beats
        );

        if sleeper.sleep(slot) == Flow::Interrupted {
            return Ok(PlayOutcome::Interrupted);
        }

        if let Some(pin) = indicator {
            board.digital_write(pin, false)?;
        }
    }

    log::info!(target: "sequencer", "🎉 done");
    Ok(PlayOutcome::Completed)
}
