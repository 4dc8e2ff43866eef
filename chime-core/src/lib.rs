//! # chime-core
//!
//! Plays a melody on a Firmata board: a buzzer sounds each note through a
//! vendor tone sysex while an LED per pitch lights up for the note's length.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use chime_core::board::Board;
//! use chime_core::config::Config;
//! use chime_core::session::run_session;
//! use chime_core::sleeper::shutdown_channel;
//!
//! let config = Config::load();
//! let board = Board::open(&config.serial_settings())?;
//! let (trigger, mut signal) = shutdown_channel();
//! // hand `trigger` to a Ctrl+C handler
//! run_session(board, config.playback_plan(), &mut signal)?;
//! ```
//!
//! ## Module Overview
//!
//! - [`firmata`]: wire encoding (tone sysex, digital port, pin mode) and the
//!   inbound parser
//! - [`board`]: `Board`, the single handle to the transport
//! - [`reader`]: background thread draining and parsing board replies
//! - [`sequencer`]: per-note timing and one pass over a melody
//! - [`session`]: play / pause / repeat loop with guaranteed LED teardown
//! - [`sleeper`]: blocking waits that Ctrl+C can cut short
//! - [`config`]: TOML configuration (embedded defaults + user override)

pub mod board;
pub mod config;
mod error;
pub mod firmata;
pub mod reader;
pub mod sequencer;
pub mod session;
pub mod sleeper;

pub use error::{ChimeError, ChimeResult};
