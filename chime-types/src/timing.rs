use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Milliseconds in one minute; one beat lasts `MS_PER_MINUTE / bpm`.
pub const MS_PER_MINUTE: u32 = 60_000;

/// Tempo in beats per minute. Always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Tempo(u16);

impl Tempo {
    pub fn new(bpm: u16) -> Result<Self, ModelError> {
        Self::checked(bpm).ok_or(ModelError::InvalidTempo)
    }

    /// `const` form of [`Tempo::new`].
    pub const fn checked(bpm: u16) -> Option<Self> {
        if bpm == 0 {
            None
        } else {
            Some(Self(bpm))
        }
    }

    pub fn bpm(self) -> u16 {
        self.0
    }

    /// Length of one beat, truncated to whole milliseconds.
    pub fn beat_ms(self) -> u32 {
        MS_PER_MINUTE / self.0 as u32
    }
}

impl TryFrom<u16> for Tempo {
    type Error = ModelError;

    fn try_from(bpm: u16) -> Result<Self, Self::Error> {
        Tempo::new(bpm)
    }
}

impl From<Tempo> for u16 {
    fn from(tempo: Tempo) -> u16 {
        tempo.0
    }
}

impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bpm", self.0)
    }
}

/// Length of a note in beats: a whole count or a simple fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Beats {
    numerator: u16,
    denominator: u16,
}

impl Beats {
    pub const ONE: Beats = Beats::whole(1);
    pub const TWO: Beats = Beats::whole(2);
    pub const HALF: Beats = Beats {
        numerator: 1,
        denominator: 2,
    };

    /// Whole number of beats.
    ///
    /// # Panics
    ///
    /// Panics if `count` is zero (at compile time when evaluated in a const).
    /// Use [`Beats::new`] for counts that are not known to be positive.
    pub const fn whole(count: u16) -> Self {
        assert!(count > 0, "beat count must be positive");
        Beats {
            numerator: count,
            denominator: 1,
        }
    }

    pub fn new(numerator: u16, denominator: u16) -> Result<Self, ModelError> {
        if numerator == 0 || denominator == 0 {
            return Err(ModelError::InvalidBeats {
                numerator,
                denominator,
            });
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    pub fn numerator(self) -> u16 {
        self.numerator
    }

    pub fn denominator(self) -> u16 {
        self.denominator
    }

    /// Duration in ms for a given beat length, truncated toward zero.
    pub fn duration_ms(self, beat_ms: u32) -> u32 {
        (beat_ms as u64 * self.numerator as u64 / self.denominator as u64) as u32
    }
}

impl fmt::Display for Beats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator == 1 {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}
