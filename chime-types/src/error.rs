use thiserror::Error;

/// Errors raised while building model values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("melody '{0}' has no notes")]
    EmptyMelody(String),

    #[error("tempo must be at least 1 bpm")]
    InvalidTempo,

    #[error("invalid beat count {numerator}/{denominator}")]
    InvalidBeats { numerator: u16, denominator: u16 },

    #[error("unknown pitch '{0}'")]
    UnknownPitch(String),

    #[error("pin {0} is outside the digital range 0..=127")]
    PinOutOfRange(u8),

    #[error("a rest cannot drive an indicator")]
    RestIndicator,
}
