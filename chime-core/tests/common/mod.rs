#![allow(dead_code)]
//! Test harness utilities for chime-core integration tests.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chime_core::sleeper::{Flow, Sleeper};

/// Writer whose bytes stay readable after the board takes ownership.
#[derive(Clone, Default)]
pub struct SharedWriter {
    bytes: Arc<Mutex<Vec<u8>>>,
    /// Fail every tone frame once this many tones went through.
    tones_before_failure: Option<usize>,
    tones_sent: Arc<Mutex<usize>>,
}

impl SharedWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_after_tones(count: usize) -> Self {
        Self {
            tones_before_failure: Some(count),
            ..Self::default()
        }
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.lock().unwrap().clone()
    }

    pub fn frames(&self) -> Vec<Frame> {
        decode_frames(&self.bytes())
    }
}

impl Write for SharedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.starts_with(&[0xF0, 0x7E]) {
            let mut sent = self.tones_sent.lock().unwrap();
            if let Some(limit) = self.tones_before_failure {
                if *sent >= limit {
                    return Err(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged"));
                }
            }
            *sent += 1;
        }
        self.bytes.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Host-to-board frame, decoded for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Tone { pin: u8, frequency: u16, duration: u16 },
    DigitalPort { port: u8, mask: u8 },
    PinMode { pin: u8, mode: u8 },
    Sysex { command: u8, data: Vec<u8> },
}

pub fn decode_frames(bytes: &[u8]) -> Vec<Frame> {
    let mut frames = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            0xF0 => {
                let end = i + bytes[i..].iter().position(|&b| b == 0xF7).expect("unterminated sysex");
                let command = bytes[i + 1];
                let data = bytes[i + 2..end].to_vec();
                if command == 0x7E {
                    frames.push(Frame::Tone {
                        pin: data[0],
                        frequency: data[1] as u16 | (data[2] as u16) << 7,
                        duration: data[3] as u16 | (data[4] as u16) << 7,
                    });
                } else {
                    frames.push(Frame::Sysex { command, data });
                }
                i = end + 1;
            }
            0xF4 => {
                frames.push(Frame::PinMode {
                    pin: bytes[i + 1],
                    mode: bytes[i + 2],
                });
                i += 3;
            }
            status if status & 0xF0 == 0x90 => {
                frames.push(Frame::DigitalPort {
                    port: status & 0x0F,
                    mask: bytes[i + 1] | (bytes[i + 2] & 0x01) << 7,
                });
                i += 3;
            }
            other => panic!("unexpected byte {:#04x} at {}", other, i),
        }
    }
    frames
}

/// Level of `pin` in every digital frame addressed to its port, in order.
pub fn pin_levels(frames: &[Frame], pin: u8) -> Vec<bool> {
    let (port, bit) = (pin / 8, pin % 8);
    frames
        .iter()
        .filter_map(|frame| match frame {
            Frame::DigitalPort { port: p, mask } if *p == port => Some(mask & (1 << bit) != 0),
            _ => None,
        })
        .collect()
}

pub fn tones(frames: &[Frame]) -> Vec<(u8, u16, u16)> {
    frames
        .iter()
        .filter_map(|frame| match frame {
            Frame::Tone {
                pin,
                frequency,
                duration,
            } => Some((*pin, *frequency, *duration)),
            _ => None,
        })
        .collect()
}

/// Records every requested wait; interrupts on the n-th call (0-based) if set.
#[derive(Debug, Default)]
pub struct ScriptedSleeper {
    pub waits: Vec<Duration>,
    interrupt_at: Option<usize>,
}

impl ScriptedSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interrupting_at(call: usize) -> Self {
        Self {
            waits: Vec::new(),
            interrupt_at: Some(call),
        }
    }

    pub fn total(&self) -> Duration {
        self.waits.iter().sum()
    }
}

impl Sleeper for ScriptedSleeper {
    fn sleep(&mut self, duration: Duration) -> Flow {
        let call = self.waits.len();
        self.waits.push(duration);
        if self.interrupt_at == Some(call) {
            Flow::Interrupted
        } else {
            Flow::Continue
        }
    }
}

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}
