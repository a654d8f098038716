// Calibration and timebase
// TK Ales, 2022

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{PulseError, Result};

/// Horizontal divisions on the instrument screen. The trigger point sits in the middle.
pub const HORIZONTAL_DIVISIONS: f64 = 14.0;

/// ADC counts per vertical division of the 8 bit front end.
pub const DEFAULT_ADC_COUNTS_PER_DIV: f64 = 25.0;

/// Scale factors for one capture, as reported by the instrument.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct CalibrationParams {
    /// Vertical scale in V/div
    pub volts_per_div: f64,
    /// Vertical offset in V
    pub vertical_offset: f64,
    /// ADC counts per vertical division
    #[serde(default = "default_adc_counts")]
    pub adc_counts_per_div: f64,
    /// Horizontal scale in s/div
    pub time_per_div: f64,
    /// Time between two samples in s
    pub sample_interval: f64,
}

fn default_adc_counts() -> f64 {
    DEFAULT_ADC_COUNTS_PER_DIV
}

impl CalibrationParams {
    /// Build the parameters from the raw answers to `C1:VDIV?`, `C1:OFST?`,
    /// `TDIV?` and `SARA?`.
    pub fn from_instrument(vdiv: f64, ofst: f64, tdiv: f64, sara: &str) -> Result<Self> {
        let rate = parse_sample_rate(sara)?;
        Ok(CalibrationParams {
            volts_per_div: vdiv,
            vertical_offset: ofst,
            adc_counts_per_div: DEFAULT_ADC_COUNTS_PER_DIV,
            time_per_div: tdiv,
            sample_interval: 1.0 / rate,
        })
    }

    /// Load parameters from a JSON document
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let rdr = BufReader::new(File::open(path)?);
        let params: CalibrationParams = serde_json::from_reader(rdr)?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.sample_interval > 0.0 && self.sample_interval.is_finite()) {
            return Err(PulseError::InvalidInput(format!(
                "sample interval must be positive, got {}",
                self.sample_interval
            )));
        }
        if self.adc_counts_per_div == 0.0 {
            return Err(PulseError::InvalidInput(
                "ADC counts per division must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn sample_rate(&self) -> f64 {
        1.0 / self.sample_interval
    }

    /// Time of the first sample relative to the trigger point
    pub fn capture_start(&self) -> f64 {
        -(self.time_per_div * HORIZONTAL_DIVISIONS / 2.0)
    }

    /// Time of sample `index` relative to the trigger point
    pub fn time_at(&self, index: usize) -> f64 {
        self.capture_start() + index as f64 * self.sample_interval
    }

    /// Convert a raw count (or a count-domain threshold) to volts
    pub fn counts_to_volts(&self, counts: f64) -> f64 {
        counts / self.adc_counts_per_div * self.volts_per_div - self.vertical_offset
    }
}

/// Convert one signed ADC sample to volts.
#[inline]
pub fn convert(sample: i8, calib: &CalibrationParams) -> f64 {
    calib.counts_to_volts(sample as f64)
}

/// Parse a sample rate answer such as `1.00GSa/s`, `500MSa` or `2.5E+08`.
pub fn parse_sample_rate(sara: &str) -> Result<f64> {
    let text = sara.trim();
    let invalid = || PulseError::InvalidSampleRate(text.to_string());

    let units = [('G', 1e9), ('M', 1e6), ('k', 1e3)];
    let (number, multiplier) = units
        .iter()
        .find_map(|&(unit, mult)| text.find(unit).map(|pos| (&text[..pos], mult)))
        .unwrap_or((text, 1.0));

    let rate = number.trim().parse::<f64>().map_err(|_| invalid())? * multiplier;
    if rate > 0.0 && rate.is_finite() {
        Ok(rate)
    } else {
        Err(invalid())
    }
}
