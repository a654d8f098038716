// Capture Module
// TK Ales, 2022

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

use crate::calibration::{self, CalibrationParams};
use crate::edges::{self, DetectorConfig, ThresholdConfig, TransitionEvent};
use crate::error::Result;
use crate::frame;
use crate::pulses::{self, PulseRecord};

/// Result of running the edge detector and width calculator over a capture.
#[derive(Debug, Clone)]
pub struct PulseAnalysis {
    pub threshold: ThresholdConfig,
    pub events: Vec<TransitionEvent>,
    pub pulses: Vec<PulseRecord>,
}

impl PulseAnalysis {
    /// Write the pulse list file
    pub fn write_pulse_list<P: AsRef<Path>>(&self, output_file: P) -> Result<()> {
        let file = File::create(&output_file)?;
        let mut writer = BufWriter::new(file);
        pulses::write_pulse_list(&mut writer, &self.pulses)?;
        writer.flush()?;
        debug!(path = %output_file.as_ref().display(), rows = self.pulses.len(), "wrote pulse list");
        Ok(())
    }
}

/// One decoded waveform capture together with its calibration.
#[derive(Debug, Clone)]
pub struct Capture {
    pub source: String,
    pub calibration: CalibrationParams,
    pub samples: Vec<i8>,
}

impl Capture {
    /// Decode a raw frame as received from the instrument
    pub fn from_bytes(raw: &[u8], calibration: CalibrationParams) -> Result<Self> {
        calibration.validate()?;
        let samples = frame::decode(raw)?;
        Ok(Capture {
            source: String::new(),
            calibration,
            samples,
        })
    }

    /// Load a raw frame dump from disk
    pub fn load_file<P: AsRef<Path>>(input_file: P, calibration: CalibrationParams) -> Result<Self> {
        let raw = fs::read(&input_file)?;
        debug!(path = %input_file.as_ref().display(), bytes = raw.len(), "read raw frame");

        let mut capture = Self::from_bytes(&raw, calibration)?;
        capture.source = input_file.as_ref().to_string_lossy().to_string();
        debug!(samples = capture.samples.len(), "decoded frame");
        Ok(capture)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Capture length in seconds
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 * self.calibration.sample_interval
    }

    pub fn voltages(&self) -> Vec<f64> {
        self.samples
            .iter()
            .map(|&s| calibration::convert(s, &self.calibration))
            .collect()
    }

    /// Sample times relative to the trigger point
    pub fn time_values(&self) -> Vec<f64> {
        (0..self.samples.len())
            .map(|i| self.calibration.time_at(i))
            .collect()
    }

    pub fn analyze(&self, config: &DetectorConfig) -> Result<PulseAnalysis> {
        let threshold = edges::threshold(&self.samples, config)?;
        let events = edges::detect_with(&self.samples, &self.calibration, &threshold);
        let pulses = pulses::widths(&events, self.samples.len(), &self.calibration);
        Ok(PulseAnalysis {
            threshold,
            events,
            pulses,
        })
    }

    /// Write the Y-T trace as `time,voltage` rows
    pub fn write_trace_csv<P: AsRef<Path>>(&self, output_file: P) -> Result<()> {
        let file = File::create(&output_file)?;
        let mut wtr = csv::Writer::from_writer(BufWriter::new(file));

        wtr.write_record(["time", "voltage"])?;
        for (t, v) in self.time_values().into_iter().zip(self.voltages()) {
            wtr.write_record(&[format!("{:.12e}", t), format!("{:.6}", v)])?;
        }

        wtr.flush()?;
        debug!(path = %output_file.as_ref().display(), rows = self.samples.len(), "wrote trace");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PulseError;
    use crate::frame::TERMINATOR;

    fn calib() -> CalibrationParams {
        CalibrationParams {
            volts_per_div: 0.5,
            vertical_offset: 0.0,
            adc_counts_per_div: 25.0,
            time_per_div: 1e-5,
            sample_interval: 1e-8,
        }
    }

    fn raw_frame(samples: &[i8]) -> Vec<u8> {
        let mut raw = format!("DAT2,#9{:09}", samples.len()).into_bytes();
        raw.extend(samples.iter().map(|&s| s as u8));
        raw.extend_from_slice(&TERMINATOR);
        raw
    }

    #[test]
    fn test_from_bytes() {
        let capture = Capture::from_bytes(&raw_frame(&[-25, 0, 25]), calib()).unwrap();
        assert_eq!(capture.len(), 3);
        assert_eq!(capture.voltages(), vec![-0.5, 0.0, 0.5]);
        assert!((capture.duration() - 3e-8).abs() < 1e-20);
    }

    #[test]
    fn test_rejects_bad_calibration() {
        let mut c = calib();
        c.sample_interval = -1.0;
        assert!(matches!(
            Capture::from_bytes(&raw_frame(&[1, 2]), c),
            Err(PulseError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_time_values() {
        let capture = Capture::from_bytes(&raw_frame(&[0; 5]), calib()).unwrap();
        let times = capture.time_values();
        let start = -7e-5;
        for (i, t) in times.iter().enumerate() {
            assert!((t - (start + i as f64 * 1e-8)).abs() < 1e-15, "time {} mismatch", i);
        }
    }

    #[test]
    fn test_analyze_square_pulse() {
        let mut samples = vec![0i8; 300];
        for s in &mut samples[120..180] {
            *s = 100;
        }
        let capture = Capture::from_bytes(&raw_frame(&samples), calib()).unwrap();
        let analysis = capture.analyze(&DetectorConfig::default()).unwrap();

        assert_eq!(analysis.threshold.threshold, 50.0);
        assert_eq!(analysis.events.len(), 2);
        assert_eq!(analysis.pulses.len(), 2);
        assert!((analysis.pulses[0].width - 60e-8).abs() < 1e-15);
        assert!((analysis.pulses[1].width - 120e-8).abs() < 1e-15);
    }

    #[test]
    fn test_analysis_writes_pulse_list() {
        let mut samples = vec![0i8; 300];
        for s in &mut samples[120..180] {
            *s = 100;
        }
        let capture = Capture::from_bytes(&raw_frame(&samples), calib()).unwrap();
        let analysis = capture.analyze(&DetectorConfig::default()).unwrap();

        let out = tempfile::NamedTempFile::new().unwrap();
        analysis.write_pulse_list(out.path()).unwrap();
        let text = std::fs::read_to_string(out.path()).unwrap();
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[1].contains(";True ;"));
        assert!(rows[2].contains(";False;"));
    }
}
