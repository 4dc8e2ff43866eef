//! Firmata wire encoding.
//!
//! Every data byte on the link keeps its top bit clear; values wider than
//! seven bits travel as LSB/MSB 7-bit pairs. Status bytes (top bit set) open
//! each message.

mod parser;

pub use parser::{FirmataParser, InboundMessage};

use chime_types::Pin;

use crate::{ChimeError, ChimeResult};

pub const DIGITAL_MESSAGE: u8 = 0x90;
pub const ANALOG_MESSAGE: u8 = 0xE0;
pub const SET_PIN_MODE: u8 = 0xF4;
pub const REPORT_VERSION: u8 = 0xF9;
pub const START_SYSEX: u8 = 0xF0;
pub const END_SYSEX: u8 = 0xF7;

/// Sysex: string sent by the board.
pub const STRING_DATA: u8 = 0x71;
/// Sysex: firmware name and version query/reply.
pub const REPORT_FIRMWARE: u8 = 0x79;
/// Sysex: vendor tone command understood by the buzzer firmware.
pub const TONE_COMMAND: u8 = 0x7E;

/// Largest value a 7-bit pair can carry.
pub const MAX_14BIT: u16 = 0x3FFF;

/// Split a 14-bit value into `(lsb, msb)`, both 7-bit clean.
/// Bits above 14 are dropped; range checks happen before this is called.
pub fn split_14bit(value: u16) -> (u8, u8) {
    ((value & 0x7F) as u8, ((value >> 7) & 0x7F) as u8)
}

pub fn join_14bit(lsb: u8, msb: u8) -> u16 {
    (lsb & 0x7F) as u16 | ((msb & 0x7F) as u16) << 7
}

/// Reject values that would not survive [`split_14bit`].
pub fn check_14bit(field: &'static str, value: u32) -> ChimeResult<u16> {
    if value > MAX_14BIT as u32 {
        return Err(ChimeError::OutOfRange {
            field,
            value,
            max: MAX_14BIT as u32,
        });
    }
    Ok(value as u16)
}

/// Pin modes accepted by `SET_PIN_MODE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    Input = 0x00,
    Output = 0x01,
}

/// A tone request for the buzzer on `pin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToneCommand {
    pub pin: Pin,
    pub frequency_hz: u16,
    pub duration_ms: u16,
}

impl ToneCommand {
    pub fn new(pin: Pin, frequency_hz: u32, duration_ms: u32) -> ChimeResult<Self> {
        Ok(Self {
            pin,
            frequency_hz: check_14bit("frequency", frequency_hz)?,
            duration_ms: check_14bit("duration", duration_ms)?,
        })
    }

    /// `[pin, freq_lo, freq_hi, dur_lo, dur_hi]`
    pub fn payload(&self) -> [u8; 5] {
        let (freq_lo, freq_hi) = split_14bit(self.frequency_hz);
        let (dur_lo, dur_hi) = split_14bit(self.duration_ms);
        [self.pin.number(), freq_lo, freq_hi, dur_lo, dur_hi]
    }
}

/// Wrap `data` in a sysex frame: `F0 command data.. F7`.
pub fn sysex(command: u8, data: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(data.len() + 3);
    frame.push(START_SYSEX);
    frame.push(command);
    frame.extend_from_slice(data);
    frame.push(END_SYSEX);
    frame
}

/// Set all eight pins of `port` from `mask` (bit n = pin `port * 8 + n`).
pub fn digital_port_message(port: u8, mask: u8) -> [u8; 3] {
    [DIGITAL_MESSAGE | (port & 0x0F), mask & 0x7F, (mask >> 7) & 0x01]
}

pub fn set_pin_mode_message(pin: Pin, mode: PinMode) -> [u8; 3] {
    [SET_PIN_MODE, pin.number(), mode as u8]
}

pub fn report_firmware_request() -> Vec<u8> {
    sysex(REPORT_FIRMWARE, &[])
}
