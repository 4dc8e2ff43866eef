use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ModelError, Pitch};

/// Digital pin number on the board. Fits a single 7-bit data byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Pin(u8);

impl Pin {
    pub const MAX: u8 = 0x7F;

    pub fn new(number: u8) -> Result<Self, ModelError> {
        Self::checked(number).ok_or(ModelError::PinOutOfRange(number))
    }

    /// `const` form of [`Pin::new`].
    pub const fn checked(number: u8) -> Option<Self> {
        if number > Self::MAX {
            None
        } else {
            Some(Self(number))
        }
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// Firmata digital port holding this pin (8 pins per port).
    pub fn port(self) -> u8 {
        self.0 / 8
    }

    /// Bit of this pin inside its port mask.
    pub fn port_bit(self) -> u8 {
        self.0 % 8
    }
}

impl TryFrom<u8> for Pin {
    type Error = ModelError;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        Pin::new(number)
    }
}

impl From<Pin> for u8 {
    fn from(pin: Pin) -> u8 {
        pin.0
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which LED lights up while a pitch sounds.
///
/// A fixed table keyed by [`Pitch::index`]. Rests never have an indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorMap {
    pins: [Option<Pin>; Pitch::COUNT],
}

impl IndicatorMap {
    /// A map with no indicators at all.
    pub fn empty() -> Self {
        Self {
            pins: [None; Pitch::COUNT],
        }
    }

    /// Assign `pin` to `pitch`, replacing any earlier assignment.
    pub fn insert(&mut self, pitch: Pitch, pin: Pin) -> Result<Option<Pin>, ModelError> {
        if pitch.is_rest() {
            return Err(ModelError::RestIndicator);
        }
        Ok(self.pins[pitch.index()].replace(pin))
    }

    pub fn pin_for(&self, pitch: Pitch) -> Option<Pin> {
        self.pins[pitch.index()]
    }

    /// Every distinct indicator pin, lowest first.
    pub fn pins(&self) -> Vec<Pin> {
        let mut pins: Vec<Pin> = self.pins.iter().flatten().copied().collect();
        pins.sort_unstable();
        pins.dedup();
        pins
    }

    pub fn iter(&self) -> impl Iterator<Item = (Pitch, Pin)> + '_ {
        Pitch::ALL
            .iter()
            .filter_map(move |&pitch| self.pin_for(pitch).map(|pin| (pitch, pin)))
    }

    pub fn len(&self) -> usize {
        self.pins.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for IndicatorMap {
    /// The LED wiring of the reference board.
    fn default() -> Self {
        let pin = |n| Some(Pin(n));
        let mut pins = [None; Pitch::COUNT];
        pins[Pitch::C4.index()] = pin(9);
        pins[Pitch::D4.index()] = pin(10);
        pins[Pitch::E4.index()] = pin(11);
        pins[Pitch::F4.index()] = pin(12);
        pins[Pitch::G4.index()] = pin(13);
        pins[Pitch::A4.index()] = pin(4);
        pins[Pitch::B4.index()] = pin(5);
        pins[Pitch::C5.index()] = pin(6);
        Self { pins }
    }
}
