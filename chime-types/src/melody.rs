use crate::{Beats, ModelError, Pitch, Tempo};

/// One step of a melody: a pitch held for a number of beats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Note {
    pub pitch: Pitch,
    pub beats: Beats,
}

impl Note {
    pub const fn new(pitch: Pitch, beats: Beats) -> Self {
        Self { pitch, beats }
    }

    /// Full slot length of this note at `tempo`, sounding time plus gap.
    pub fn duration_ms(&self, tempo: Tempo) -> u32 {
        self.beats.duration_ms(tempo.beat_ms())
    }
}

const fn n(pitch: Pitch, beats: u16) -> Note {
    Note::new(pitch, Beats::whole(beats))
}

/// "Twinkle Twinkle Little Star", one phrase per line.
const TWINKLE_STAR: [Note; 28] = {
    use Pitch::*;
    [
        n(C4, 1), n(C4, 1), n(G4, 1), n(G4, 1), n(A4, 1), n(A4, 1), n(G4, 2),
        n(F4, 1), n(F4, 1), n(E4, 1), n(E4, 1), n(D4, 1), n(D4, 1), n(C4, 2),
        n(G4, 1), n(G4, 1), n(F4, 1), n(F4, 1), n(E4, 1), n(E4, 1), n(D4, 2),
        n(G4, 1), n(G4, 1), n(F4, 1), n(F4, 1), n(E4, 1), n(E4, 1), n(D4, 2),
    ]
};

/// A named, non-empty, ordered sequence of notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Melody {
    name: String,
    notes: Vec<Note>,
}

impl Melody {
    pub fn new(name: impl Into<String>, notes: Vec<Note>) -> Result<Self, ModelError> {
        let name = name.into();
        if notes.is_empty() {
            return Err(ModelError::EmptyMelody(name));
        }
        Ok(Self { name, notes })
    }

    pub fn twinkle_star() -> Self {
        Self {
            name: "Twinkle Twinkle Little Star".to_string(),
            notes: TWINKLE_STAR.to_vec(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Note> {
        self.notes.iter()
    }

    /// Wall time of one pass at `tempo`, summing the truncated note lengths.
    pub fn duration_ms(&self, tempo: Tempo) -> u64 {
        self.notes
            .iter()
            .map(|note| note.duration_ms(tempo) as u64)
            .sum()
    }
}

impl<'a> IntoIterator for &'a Melody {
    type Item = &'a Note;
    type IntoIter = std::slice::Iter<'a, Note>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
