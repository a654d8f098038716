// Waveform frame decoder
// TK Ales, 2022

//! Decoding of the instrument's `C1:WF? DAT2` response.
//!
//! A frame looks like `DAT2,#9003500000<payload>\n\n`: a 16 byte preamble
//! carrying the payload length in ASCII decimal, one byte per sample and a
//! two byte line-feed terminator.

use crate::error::{PulseError, Result};

/// Size of the preamble in front of the sample payload.
pub const HEADER_LEN: usize = 16;

/// Byte range of the ASCII length digest inside the preamble.
pub const LENGTH_FIELD: std::ops::Range<usize> = 9..16;

/// Terminator appended by the instrument after the payload.
pub const TERMINATOR: [u8; 2] = [b'\n', b'\n'];

/// Reinterpret a raw payload byte as a signed ADC count.
#[inline]
pub fn to_signed(byte: u8) -> i8 {
    byte as i8
}

/// Decode a complete raw frame into signed samples.
///
/// The buffer must hold the whole response including the terminator; end of
/// frame detection is the transport's job.
pub fn decode(raw: &[u8]) -> Result<Vec<i8>> {
    if raw.len() < HEADER_LEN + TERMINATOR.len() || !raw.ends_with(&TERMINATOR) {
        return Err(PulseError::TruncatedFrame);
    }

    let declared = parse_length(&raw[LENGTH_FIELD])?;
    let payload = &raw[HEADER_LEN..raw.len() - TERMINATOR.len()];

    if payload.len() != declared {
        return Err(PulseError::LengthMismatch {
            declared,
            actual: payload.len(),
        });
    }
    if declared == 0 {
        return Err(PulseError::EmptyPayload);
    }

    Ok(payload.iter().map(|&b| to_signed(b)).collect())
}

fn parse_length(field: &[u8]) -> Result<usize> {
    let malformed = || PulseError::MalformedHeader(String::from_utf8_lossy(field).into_owned());

    field.iter().try_fold(0usize, |acc, &c| {
        if !c.is_ascii_digit() {
            return Err(malformed());
        }
        acc.checked_mul(10)
            .and_then(|v| v.checked_add((c - b'0') as usize))
            .ok_or_else(malformed)
    })
}
