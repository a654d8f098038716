// Edge detection
// TK Ales, 2022

use std::fmt;

use crate::calibration::{self, CalibrationParams};
use crate::error::{PulseError, Result};

/// Tunables of the edge detector.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectorConfig {
    /// Samples excluded at each end of the capture when searching for extrema
    pub guard: usize,
    /// Half-width of the dead band around the threshold, in ADC counts
    pub hysteresis_counts: u8,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig {
            guard: 100,
            hysteresis_counts: 2,
        }
    }
}

/// Threshold derived from the inner window of a capture, in ADC counts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThresholdConfig {
    pub max: i8,
    pub min: i8,
    pub threshold: f64,
    pub hysteresis: f64,
}

impl ThresholdConfig {
    pub fn upper(&self) -> f64 {
        self.threshold + self.hysteresis
    }

    pub fn lower(&self) -> f64 {
        self.threshold - self.hysteresis
    }
}

/// Logic level entered at a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl Level {
    pub fn is_high(self) -> bool {
        self == Level::High
    }
}

impl fmt::Display for Level {
    /// Renders as `True`/`False`, the spelling downstream pulse lists expect.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(if self.is_high() { "True" } else { "False" })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionEvent {
    /// Sample index of the crossing
    pub index: usize,
    /// Seconds relative to the trigger point
    pub timestamp: f64,
    /// Voltage of the sample that crossed
    pub voltage: f64,
    pub level: Level,
}

/// Compute the threshold over `[guard, len - guard)`.
pub fn threshold(samples: &[i8], config: &DetectorConfig) -> Result<ThresholdConfig> {
    let guard = config.guard;
    if samples.len() <= guard.saturating_mul(2) {
        return Err(PulseError::InsufficientSamples {
            samples: samples.len(),
            guard,
        });
    }

    let window = &samples[guard..samples.len() - guard];
    let (min, max) = window
        .iter()
        .fold((i8::MAX, i8::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    Ok(ThresholdConfig {
        max,
        min,
        threshold: (max as f64 + min as f64) / 2.0,
        hysteresis: config.hysteresis_counts as f64,
    })
}

/// Scan the whole capture and emit an event every time the signal leaves the
/// hysteresis band on the side opposite to the current level.
///
/// The signal is assumed low before the first sample, so the first event is
/// always a rising one.
pub fn detect(
    samples: &[i8],
    calib: &CalibrationParams,
    config: &DetectorConfig,
) -> Result<Vec<TransitionEvent>> {
    let thresh = threshold(samples, config)?;
    Ok(detect_with(samples, calib, &thresh))
}

/// Same as [`detect`] with a precomputed threshold.
pub fn detect_with(
    samples: &[i8],
    calib: &CalibrationParams,
    thresh: &ThresholdConfig,
) -> Vec<TransitionEvent> {
    let (upper, lower) = (thresh.upper(), thresh.lower());

    let mut events = Vec::new();
    let mut currently_high = false;

    for (index, &raw) in samples.iter().enumerate() {
        let v = raw as f64;
        let level = if !currently_high && v > upper {
            Level::High
        } else if currently_high && v < lower {
            Level::Low
        } else {
            continue;
        };

        currently_high = level.is_high();
        events.push(TransitionEvent {
            index,
            timestamp: calib.time_at(index),
            voltage: calibration::convert(raw, calib),
            level,
        });
    }

    events
}
