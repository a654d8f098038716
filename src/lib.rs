// src/lib.rs
// Pulse Reader Library - Public API

//! # Pulse Reader
//!
//! A Rust library for decoding oscilloscope waveform frames and measuring
//! the pulses they contain.
//!
//! ## Features
//!
//! - Decode `DAT2` length-prefixed waveform frames with truncation checks
//! - Convert raw ADC counts to volts from the channel calibration
//! - Detect logic transitions with a midpoint threshold and hysteresis
//! - Compute pulse widths and write the `;` separated pulse list
//! - Export the Y-T trace to CSV
//!
//! ## Example
//!
//! ```no_run
//! use pulse_reader::{CalibrationParams, Capture, DetectorConfig};
//!
//! let calib = CalibrationParams::from_instrument(1.0, 0.0, 1e-3, "1.00MSa")
//!     .expect("Bad sample rate");
//! let capture = Capture::load_file("c1_wf.bin", calib).expect("Failed to load frame");
//!
//! let analysis = capture.analyze(&DetectorConfig::default()).expect("Capture too short");
//! for pulse in &analysis.pulses {
//!     println!("#{} {} for {} s", pulse.sequence_number, pulse.level, pulse.width);
//! }
//!
//! analysis.write_pulse_list("pulse_list.csv").expect("Failed to write CSV");
//! ```

pub mod calibration;
mod capture;
pub mod edges;
mod error;
pub mod frame;
pub mod pulses;

pub use calibration::CalibrationParams;
pub use capture::{Capture, PulseAnalysis};
pub use edges::{DetectorConfig, Level, ThresholdConfig, TransitionEvent};
pub use error::{PulseError, Result};
pub use pulses::PulseRecord;
