use std::fmt;
use std::str::FromStr;

use crate::ModelError;

/// Symbolic pitch of a melody note.
///
/// Covers the C major octave the board's buzzer plays plus `Rest`.
/// Frequencies are whole Hz, which is all the tone command can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Pitch {
    C4,
    D4,
    E4,
    F4,
    G4,
    A4,
    B4,
    C5,
    Rest,
}

impl Pitch {
    pub const COUNT: usize = 9;

    pub const ALL: [Pitch; Pitch::COUNT] = [
        Pitch::C4,
        Pitch::D4,
        Pitch::E4,
        Pitch::F4,
        Pitch::G4,
        Pitch::A4,
        Pitch::B4,
        Pitch::C5,
        Pitch::Rest,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Pitch::C4 => "C4",
            Pitch::D4 => "D4",
            Pitch::E4 => "E4",
            Pitch::F4 => "F4",
            Pitch::G4 => "G4",
            Pitch::A4 => "A4",
            Pitch::B4 => "B4",
            Pitch::C5 => "C5",
            Pitch::Rest => "REST",
        }
    }

    /// Frequency in Hz; 0 for a rest.
    pub fn frequency_hz(&self) -> u16 {
        match self {
            Pitch::C4 => 261,
            Pitch::D4 => 294,
            Pitch::E4 => 330,
            Pitch::F4 => 349,
            Pitch::G4 => 392,
            Pitch::A4 => 440,
            Pitch::B4 => 494,
            Pitch::C5 => 523,
            Pitch::Rest => 0,
        }
    }

    pub fn is_rest(&self) -> bool {
        self.frequency_hz() == 0
    }

    /// Position in [`Pitch::ALL`], used to key fixed-size lookup tables.
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Pitch {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "C4" => Ok(Pitch::C4),
            "D4" => Ok(Pitch::D4),
            "E4" => Ok(Pitch::E4),
            "F4" => Ok(Pitch::F4),
            "G4" => Ok(Pitch::G4),
            "A4" => Ok(Pitch::A4),
            "B4" => Ok(Pitch::B4),
            "C5" => Ok(Pitch::C5),
            "REST" | "R" => Ok(Pitch::Rest),
            _ => Err(ModelError::UnknownPitch(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_is_440() {
        assert_eq!(Pitch::A4.frequency_hz(), 440);
    }

    #[test]
    fn only_rest_is_silent() {
        for pitch in Pitch::ALL {
            assert_eq!(pitch.is_rest(), pitch == Pitch::Rest, "{}", pitch);
        }
    }

    #[test]
    fn index_matches_all_order() {
        for (i, pitch) in Pitch::ALL.iter().enumerate() {
            assert_eq!(pitch.index(), i);
        }
    }

    #[test]
    fn parse_names() {
        assert_eq!("C4".parse::<Pitch>(), Ok(Pitch::C4));
        assert_eq!("c5".parse::<Pitch>(), Ok(Pitch::C5));
        assert_eq!("REST".parse::<Pitch>(), Ok(Pitch::Rest));
        assert_eq!(
            "H2".parse::<Pitch>(),
            Err(ModelError::UnknownPitch("H2".to_string()))
        );
    }

    #[test]
    fn display_matches_name() {
        for pitch in Pitch::ALL {
            assert_eq!(pitch.to_string().parse::<Pitch>(), Ok(pitch));
        }
    }
}
