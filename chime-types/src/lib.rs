//! # chime-types
//!
//! Shared data model for chime: pitches and their frequencies, beat counts,
//! tempo, melodies, and the pitch-to-indicator pin mapping.
//!
//! Everything here is plain data. Nothing in this crate touches the serial
//! link or sleeps.

mod error;
pub mod melody;
pub mod pin;
pub mod pitch;
pub mod timing;

pub use error::ModelError;
pub use melody::{Melody, Note};
pub use pin::{IndicatorMap, Pin};
pub use pitch::Pitch;
pub use timing::{Beats, Tempo};
