mod common;

use chime_core::board::Board;
use chime_core::sequencer::{play_melody, PlayOutcome};
use chime_core::ChimeError;
use chime_types::{Beats, IndicatorMap, Melody, Note, Pin, Pitch, Tempo};

use common::{ms, pin_levels, tones, Frame, ScriptedSleeper, SharedWriter};

fn speaker() -> Pin {
    Pin::new(8).unwrap()
}

fn tempo(bpm: u16) -> Tempo {
    Tempo::new(bpm).unwrap()
}

fn single(pitch: Pitch, beats: Beats) -> Melody {
    Melody::new("single", vec![Note::new(pitch, beats)]).unwrap()
}

#[test]
fn test_c4_at_100_bpm() {
    let writer = SharedWriter::new();
    let mut board = Board::new(writer.clone());
    let mut sleeper = ScriptedSleeper::new();

    let outcome = play_melody(
        &mut board,
        speaker(),
        &single(Pitch::C4, Beats::ONE),
        tempo(100),
        &IndicatorMap::default(),
        &mut sleeper,
    )
    .unwrap();

    assert_eq!(outcome, PlayOutcome::Completed);
    assert_eq!(
        writer.frames(),
        vec![
            Frame::Tone {
                pin: 8,
                frequency: 261,
                duration: 480,
            },
            Frame::DigitalPort { port: 1, mask: 0b10 },
            Frame::DigitalPort { port: 1, mask: 0 },
        ]
    );
    assert_eq!(sleeper.waits, vec![ms(600)]);
}

#[test]
fn test_rest_at_120_bpm() {
    let writer = SharedWriter::new();
    let mut board = Board::new(writer.clone());
    let mut sleeper = ScriptedSleeper::new();

    let outcome = play_melody(
        &mut board,
        speaker(),
        &single(Pitch::Rest, Beats::TWO),
        tempo(120),
        &IndicatorMap::default(),
        &mut sleeper,
    )
    .unwrap();

    assert_eq!(outcome, PlayOutcome::Completed);
    assert!(writer.bytes().is_empty());
    assert_eq!(sleeper.waits, vec![ms(1000)]);
}

#[test]
fn test_unmapped_pitch_sounds_without_indicator() {
    let writer = SharedWriter::new();
    let mut board = Board::new(writer.clone());
    let mut sleeper = ScriptedSleeper::new();

    play_melody(
        &mut board,
        speaker(),
        &single(Pitch::B4, Beats::ONE),
        tempo(100),
        &IndicatorMap::empty(),
        &mut sleeper,
    )
    .unwrap();

    assert_eq!(
        writer.frames(),
        vec![Frame::Tone {
            pin: 8,
            frequency: 494,
            duration: 480,
        }]
    );
    assert_eq!(sleeper.waits, vec![ms(600)]);
}

#[test]
fn test_twinkle_star_full_pass() {
    let writer = SharedWriter::new();
    let mut board = Board::new(writer.clone());
    let mut sleeper = ScriptedSleeper::new();
    let melody = Melody::twinkle_star();

    let outcome = play_melody(
        &mut board,
        speaker(),
        &melody,
        tempo(100),
        &IndicatorMap::default(),
        &mut sleeper,
    )
    .unwrap();
    assert_eq!(outcome, PlayOutcome::Completed);

    let frames = writer.frames();
    let sent = tones(&frames);
    assert_eq!(sent.len(), 28);
    for (note, (pin, frequency, duration)) in melody.iter().zip(&sent) {
        assert_eq!(*pin, 8);
        assert_eq!(*frequency, note.pitch.frequency_hz());
        let expected = if note.beats == Beats::TWO { 960 } else { 480 };
        assert_eq!(*duration, expected);
    }

    assert_eq!(sleeper.waits.len(), 28);
    assert_eq!(sleeper.total(), ms(32 * 600));

    // Every pulse returns low: G4 (pin 13) plays 7 times.
    let g4 = melody.iter().filter(|n| n.pitch == Pitch::G4).count();
    assert_eq!(g4, 7);
    let levels = pin_levels(&frames, 13);
    assert_eq!(levels.iter().filter(|&&high| high).count(), g4);
    assert_eq!(levels.last(), Some(&false));
}

#[test]
fn test_transport_error_aborts_pass() {
    let writer = SharedWriter::failing_after_tones(3);
    let mut board = Board::new(writer.clone());
    let mut sleeper = ScriptedSleeper::new();

    let result = play_melody(
        &mut board,
        speaker(),
        &Melody::twinkle_star(),
        tempo(100),
        &IndicatorMap::default(),
        &mut sleeper,
    );

    assert!(matches!(result, Err(ChimeError::Io(_))));
    assert_eq!(tones(&writer.frames()).len(), 3);
    assert_eq!(sleeper.waits.len(), 3);
}

#[test]
fn test_interrupt_mid_note_leaves_indicator_for_teardown() {
    let writer = SharedWriter::new();
    let mut board = Board::new(writer.clone());
    let mut sleeper = ScriptedSleeper::interrupting_at(1);

    let outcome = play_melody(
        &mut board,
        speaker(),
        &Melody::twinkle_star(),
        tempo(100),
        &IndicatorMap::default(),
        &mut sleeper,
    )
    .unwrap();

    assert_eq!(outcome, PlayOutcome::Interrupted);
    assert_eq!(tones(&writer.frames()).len(), 2);
    assert_eq!(pin_levels(&writer.frames(), 9), vec![true, false, true]);
    assert!(board.digital_level(Pin::new(9).unwrap()));
}

#[test]
fn test_fractional_beats_truncate() {
    let writer = SharedWriter::new();
    let mut board = Board::new(writer.clone());
    let mut sleeper = ScriptedSleeper::new();

    // 70 bpm: beat 857 ms, half beat 428 ms, sounding 342 ms
    play_melody(
        &mut board,
        speaker(),
        &single(Pitch::A4, Beats::HALF),
        tempo(70),
        &IndicatorMap::empty(),
        &mut sleeper,
    )
    .unwrap();

    assert_eq!(tones(&writer.frames()), vec![(8, 440, 342)]);
    assert_eq!(sleeper.waits, vec![ms(428)]);
}
