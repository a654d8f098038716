// Pulse Reader error types
// TK Ales, 2022

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PulseError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Calibration file error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Received data truncated: frame terminator missing or corrupt")]
    TruncatedFrame,

    #[error("Malformed header: length field {0:?} is not a decimal number")]
    MalformedHeader(String),

    #[error("Wrong data size: header declares {declared} samples, payload holds {actual}")]
    LengthMismatch { declared: usize, actual: usize },

    #[error("No data: frame payload is empty")]
    EmptyPayload,

    #[error("Insufficient samples: {samples} samples cannot cover a guard band of {guard} on each side")]
    InsufficientSamples { samples: usize, guard: usize },

    #[error("Invalid sample rate: {0:?}")]
    InvalidSampleRate(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, PulseError>;
