use super::{
    join_14bit, ANALOG_MESSAGE, DIGITAL_MESSAGE, END_SYSEX, REPORT_FIRMWARE, REPORT_VERSION,
    START_SYSEX, STRING_DATA,
};

/// Sysex bodies longer than this are dropped rather than buffered.
const MAX_SYSEX_LEN: usize = 1024;

/// A message received from the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    ProtocolVersion {
        major: u8,
        minor: u8,
    },
    FirmwareReport {
        major: u8,
        minor: u8,
        name: String,
    },
    StringData(String),
    /// Any sysex the parser has no dedicated variant for.
    Sysex {
        command: u8,
        data: Vec<u8>,
    },
    DigitalPort {
        port: u8,
        mask: u8,
    },
    AnalogValue {
        pin: u8,
        value: u16,
    },
}

#[derive(Debug)]
enum ParseState {
    Idle,
    /// A three-byte channel message waiting for its two data bytes.
    Fixed {
        status: u8,
        data: [u8; 2],
        received: usize,
    },
    Sysex(Vec<u8>),
    /// Oversized sysex: swallow bytes until END_SYSEX.
    Discard,
}

/// Incremental parser for the board-to-host byte stream.
///
/// Bytes may arrive split across reads; partial messages stay buffered until
/// completed. A status byte arriving mid-message abandons the partial one.
#[derive(Debug)]
pub struct FirmataParser {
    state: ParseState,
}

impl FirmataParser {
    pub fn new() -> Self {
        Self {
            state: ParseState::Idle,
        }
    }

    /// Feed a chunk of bytes, returning every message it completes.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<InboundMessage> {
        bytes.iter().filter_map(|&b| self.push(b)).collect()
    }

    /// Feed one byte.
    pub fn push(&mut self, byte: u8) -> Option<InboundMessage> {
        if byte & 0x80 != 0 {
            return self.push_status(byte);
        }

        match &mut self.state {
            ParseState::Idle | ParseState::Discard => None,
            ParseState::Sysex(body) => {
                if body.len() >= MAX_SYSEX_LEN {
                    log::debug!(target: "firmata", "dropping oversized sysex");
                    self.state = ParseState::Discard;
                } else {
                    body.push(byte);
                }
                None
            }
            ParseState::Fixed {
                status,
                data,
                received,
            } => {
                data[*received] = byte;
                *received += 1;
                if *received < 2 {
                    return None;
                }
                let message = parse_fixed(*status, *data);
                self.state = ParseState::Idle;
                message
            }
        }
    }

    fn push_status(&mut self, byte: u8) -> Option<InboundMessage> {
        if byte == END_SYSEX {
            let state = std::mem::replace(&mut self.state, ParseState::Idle);
            return match state {
                ParseState::Sysex(body) => parse_sysex(&body),
                _ => None,
            };
        }

        self.state = match byte {
            START_SYSEX => ParseState::Sysex(Vec::new()),
            REPORT_VERSION => fixed(byte),
            b if b & 0xF0 == DIGITAL_MESSAGE || b & 0xF0 == ANALOG_MESSAGE => fixed(b),
            _ => ParseState::Idle,
        };
        None
    }
}

impl Default for FirmataParser {
    fn default() -> Self {
        Self::new()
    }
}

fn fixed(status: u8) -> ParseState {
    ParseState::Fixed {
        status,
        data: [0; 2],
        received: 0,
    }
}

fn parse_fixed(status: u8, data: [u8; 2]) -> Option<InboundMessage> {
    if status == REPORT_VERSION {
        return Some(InboundMessage::ProtocolVersion {
            major: data[0],
            minor: data[1],
        });
    }

    let channel = status & 0x0F;
    match status & 0xF0 {
        DIGITAL_MESSAGE => Some(InboundMessage::DigitalPort {
            port: channel,
            mask: data[0] | (data[1] & 0x01) << 7,
        }),
        ANALOG_MESSAGE => Some(InboundMessage::AnalogValue {
            pin: channel,
            value: join_14bit(data[0], data[1]),
        }),
        _ => None,
    }
}

fn parse_sysex(body: &[u8]) -> Option<InboundMessage> {
    let (&command, data) = body.split_first()?;
    match command {
        REPORT_FIRMWARE if data.len() >= 2 => Some(InboundMessage::FirmwareReport {
            major: data[0],
            minor: data[1],
            name: decode_7bit_text(&data[2..]),
        }),
        STRING_DATA => Some(InboundMessage::StringData(decode_7bit_text(data))),
        _ => Some(InboundMessage::Sysex {
            command,
            data: data.to_vec(),
        }),
    }
}

/// Decode text sent as LSB/MSB 7-bit pairs; a trailing odd byte is ignored.
fn decode_7bit_text(data: &[u8]) -> String {
    data.chunks_exact(2)
        .filter_map(|pair| char::from_u32(join_14bit(pair[0], pair[1]) as u32))
        .collect()
}
