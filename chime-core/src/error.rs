//! Error type shared by every fallible operation in chime-core.

use std::path::PathBuf;

use chime_types::ModelError;
use thiserror::Error;

/// Result type for chime-core operations.
pub type ChimeResult<T = ()> = Result<T, ChimeError>;

#[derive(Debug, Error)]
pub enum ChimeError {
    /// The serial port could not be opened. Fatal at startup.
    #[error("could not open serial port {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },

    /// Writing to (or cloning) the transport failed.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value does not fit the 7-bit clean wire encoding.
    #[error("{field} value {value} exceeds wire maximum {max}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        max: u32,
    },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("invalid config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

impl ChimeError {
    pub(crate) fn open(port: &str, source: serialport::Error) -> Self {
        ChimeError::Open {
            port: port.to_string(),
            source,
        }
    }
}
