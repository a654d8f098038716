// Pulse width calculation and pulse list output
// TK Ales, 2022

use std::io::Write;

use crate::calibration::CalibrationParams;
use crate::edges::{Level, TransitionEvent};
use crate::error::Result;

/// One entry of the pulse list: a level held from `start_time` for `width` seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PulseRecord {
    pub start_time: f64,
    pub width: f64,
    /// A rising edge and the following falling edge share one number.
    pub sequence_number: usize,
    pub level: Level,
    pub voltage: f64,
}

/// Pulse number of the event at `event_index`, counting from one.
#[inline]
pub fn sequence_number(event_index: usize) -> usize {
    1 + event_index / 2
}

/// Turn transitions into pulse records. Each record lasts until the next
/// transition; the last one is bounded by the end of the capture.
pub fn widths(
    events: &[TransitionEvent],
    total_samples: usize,
    calib: &CalibrationParams,
) -> Vec<PulseRecord> {
    let end_of_capture = calib.time_at(total_samples);

    events
        .iter()
        .enumerate()
        .map(|(i, event)| {
            let until = events.get(i + 1).map_or(end_of_capture, |next| next.timestamp);
            PulseRecord {
                start_time: event.timestamp,
                width: until - event.timestamp,
                sequence_number: sequence_number(i),
                level: event.level,
                voltage: event.voltage,
            }
        })
        .collect()
}

pub const PULSE_LIST_HEADER: [&str; 5] = ["time", "width", "cnt", "level", "volt"];

/// Write the `;` separated pulse list: time in ms, width in us, pulse number,
/// level and voltage.
pub fn write_pulse_list<W: Write>(wtr: W, pulses: &[PulseRecord]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().delimiter(b';').from_writer(wtr);

    wtr.write_record(PULSE_LIST_HEADER)?;
    for p in pulses {
        wtr.write_record(&[
            format!("{:6.2}", p.start_time * 1e3),
            format!("{:5.0}", p.width * 1e6),
            format!("{:3}", p.sequence_number),
            format!("{: <5}", p.level),
            format!("{:6.2}", p.voltage),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calib() -> CalibrationParams {
        CalibrationParams {
            volts_per_div: 1.0,
            vertical_offset: 0.0,
            adc_counts_per_div: 25.0,
            time_per_div: 1e-3,
            sample_interval: 1e-6,
        }
    }

    fn event(index: usize, level: Level, c: &CalibrationParams) -> TransitionEvent {
        TransitionEvent {
            index,
            timestamp: c.time_at(index),
            voltage: if level.is_high() { 3.3 } else { 0.0 },
            level,
        }
    }

    #[test]
    fn test_no_events_no_pulses() {
        assert!(widths(&[], 1000, &calib()).is_empty());
    }

    #[test]
    fn test_widths_and_trailing_record() {
        let c = calib();
        let events = [
            event(100, Level::High, &c),
            event(150, Level::Low, &c),
            event(400, Level::High, &c),
        ];
        let pulses = widths(&events, 1000, &c);

        assert_eq!(pulses.len(), 3);
        assert!((pulses[0].width - 50e-6).abs() < 1e-12);
        assert!((pulses[1].width - 250e-6).abs() < 1e-12);
        assert!((pulses[2].width - 600e-6).abs() < 1e-12);

        let total: f64 = pulses.iter().map(|p| p.width).sum();
        assert!((total - (c.time_at(1000) - events[0].timestamp)).abs() < 1e-12);
    }

    #[test]
    fn test_sequence_numbers_pair_up() {
        let numbers: Vec<usize> = (0..5).map(sequence_number).collect();
        assert_eq!(numbers, vec![1, 1, 2, 2, 3]);
    }

    #[test]
    fn test_pulse_list_format() {
        let c = calib();
        let events = [event(7100, Level::High, &c), event(7150, Level::Low, &c)];
        let pulses = widths(&events, 7300, &c);

        let mut out = Vec::new();
        write_pulse_list(&mut out, &pulses).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "time;width;cnt;level;volt");
        assert_eq!(lines[1], "  0.10;   50;  1;True ;  3.30");
        assert_eq!(lines[2], "  0.15;  150;  1;False;  0.00");
        assert_eq!(lines.len(), 3);
    }
}
