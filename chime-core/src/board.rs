//! Board: the one handle to the microcontroller.
//!
//! Owns the write side of the transport, the last digital mask written to
//! every port, and (when opened over serial) the inbound reader thread.
//! Created once at startup and passed by `&mut` to whatever needs to talk to
//! the board.

use std::io::Write;
use std::thread;
use std::time::Duration;

use chime_types::Pin;
use serialport::SerialPort;

use crate::firmata::{self, InboundMessage, PinMode, ToneCommand};
use crate::reader::InboundReader;
use crate::{ChimeError, ChimeResult};

/// Baud rate StandardFirmata listens on.
pub const DEFAULT_BAUD_RATE: u32 = 57_600;

/// Pins 0..=127 spread over 16 ports of eight.
const PORT_COUNT: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialSettings {
    pub port: String,
    pub baud_rate: u32,
    /// Pause after opening; most boards reset when the port opens.
    pub settle: Duration,
    /// Read timeout for the reader thread, bounds how long close blocks.
    pub read_timeout: Duration,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            port: "COM8".to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            settle: Duration::from_secs(2),
            read_timeout: Duration::from_millis(50),
        }
    }
}

pub struct Board<W: Write> {
    writer: W,
    port_masks: [u8; PORT_COUNT],
    inbound: Option<InboundReader>,
}

impl Board<Box<dyn SerialPort>> {
    /// Open the serial port, start the reader, and ask for the firmware name.
    pub fn open(settings: &SerialSettings) -> ChimeResult<Self> {
        let port = serialport::new(settings.port.as_str(), settings.baud_rate)
            .timeout(settings.read_timeout)
            .open()
            .map_err(|e| ChimeError::open(&settings.port, e))?;
        let read_half = port
            .try_clone()
            .map_err(|e| ChimeError::open(&settings.port, e))?;

        log::info!(
            target: "firmata",
            "opened {} at {} baud",
            settings.port,
            settings.baud_rate
        );

        let mut board = Board::new(port).with_reader(InboundReader::spawn(read_half));
        thread::sleep(settings.settle);
        board.request_firmware()?;
        Ok(board)
    }
}

impl<W: Write> Board<W> {
    /// Wrap an already-open transport. Every port starts all-low.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            port_masks: [0; PORT_COUNT],
            inbound: None,
        }
    }

    pub fn with_reader(mut self, reader: InboundReader) -> Self {
        self.inbound = Some(reader);
        self
    }

    pub fn set_pin_mode(&mut self, pin: Pin, mode: PinMode) -> ChimeResult {
        log::debug!(target: "firmata", "pin {} -> {:?}", pin, mode);
        self.write_frame(&firmata::set_pin_mode_message(pin, mode))
    }

    /// Drive one digital pin. The other pins of its port keep their last
    /// written level.
    pub fn digital_write(&mut self, pin: Pin, high: bool) -> ChimeResult {
        let port = pin.port();
        let bit = 1u8 << pin.port_bit();
        let current = self.port_masks[port as usize];
        let mask = if high { current | bit } else { current & !bit };
        self.write_frame(&firmata::digital_port_message(port, mask))?;
        // only cache what the board actually received
        self.port_masks[port as usize] = mask;
        Ok(())
    }

    /// Last level written to `pin`.
    pub fn digital_level(&self, pin: Pin) -> bool {
        self.port_masks[pin.port() as usize] & (1 << pin.port_bit()) != 0
    }

    /// Send a sysex command. `command` and `data` must be 7-bit clean.
    pub fn send_sysex(&mut self, command: u8, data: &[u8]) -> ChimeResult {
        if let Some(&byte) = std::iter::once(&command).chain(data).find(|&&b| b > 0x7F) {
            return Err(ChimeError::OutOfRange {
                field: "sysex byte",
                value: byte as u32,
                max: 0x7F,
            });
        }
        self.write_frame(&firmata::sysex(command, data))
    }

    /// Ask the buzzer on `pin` to sound `frequency_hz` for `duration_ms`.
    pub fn play_tone(&mut self, pin: Pin, frequency_hz: u32, duration_ms: u32) -> ChimeResult {
        let tone = ToneCommand::new(pin, frequency_hz, duration_ms)?;
        self.send_tone(&tone)
    }

    pub fn send_tone(&mut self, tone: &ToneCommand) -> ChimeResult {
        log::trace!(target: "firmata", "tone {:?}", tone);
        self.send_sysex(firmata::TONE_COMMAND, &tone.payload())
    }

    pub fn request_firmware(&mut self) -> ChimeResult {
        self.write_frame(&firmata::report_firmware_request())
    }

    /// Messages the reader has collected since the last poll.
    pub fn poll_inbound(&self) -> Vec<InboundMessage> {
        self.inbound
            .as_ref()
            .map(InboundReader::drain)
            .unwrap_or_default()
    }

    /// A reader was started and has since stopped; no further replies will
    /// arrive.
    pub fn inbound_closed(&self) -> bool {
        self.inbound
            .as_ref()
            .map_or(false, InboundReader::is_finished)
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Stop the reader and give back the transport.
    pub fn into_writer(mut self) -> W {
        self.inbound.take();
        self.writer
    }

    fn write_frame(&mut self, bytes: &[u8]) -> ChimeResult {
        self.writer.write_all(bytes)?;
        self.writer.flush()?;
        Ok(())
    }
}
