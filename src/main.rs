// src/main.rs
// Command-line application for Pulse Reader

use anyhow::{bail, Context, Result};
use argh::FromArgs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pulse_reader::{CalibrationParams, Capture, DetectorConfig, PulseAnalysis};

#[derive(FromArgs, Debug)]
/// Decode a captured waveform frame and measure its pulses.
struct CliArgs {
    /// calibration JSON file (volts_per_div, vertical_offset, time_per_div, sample_interval)
    #[argh(option, short = 'c')]
    calibration: Option<PathBuf>,
    /// vertical scale in V/div
    #[argh(option)]
    vdiv: Option<f64>,
    /// vertical offset in V
    #[argh(option, default = "0.0")]
    ofst: f64,
    /// horizontal scale in s/div
    #[argh(option)]
    tdiv: Option<f64>,
    /// sample rate as reported by the instrument, e.g. 1.00GSa
    #[argh(option)]
    sara: Option<String>,
    /// samples ignored at each end when computing the threshold
    #[argh(option)]
    guard: Option<usize>,
    /// hysteresis around the threshold in ADC counts
    #[argh(option)]
    hysteresis: Option<u8>,
    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs, Debug)]
#[argh(subcommand)]
enum Command {
    Info(InfoArgs),
    Pulses(PulsesArgs),
    Trace(TraceArgs),
}

#[derive(FromArgs, Debug)]
/// Display capture and threshold information
#[argh(subcommand, name = "info")]
struct InfoArgs {
    /// raw frame file
    #[argh(positional)]
    input: PathBuf,
}

#[derive(FromArgs, Debug)]
/// Write the pulse list
#[argh(subcommand, name = "pulses")]
struct PulsesArgs {
    /// raw frame file
    #[argh(positional)]
    input: PathBuf,
    /// output file
    #[argh(positional, default = "PathBuf::from(\"pulse_list.csv\")")]
    output: PathBuf,
}

#[derive(FromArgs, Debug)]
/// Write the time/voltage trace
#[argh(subcommand, name = "trace")]
struct TraceArgs {
    /// raw frame file
    #[argh(positional)]
    input: PathBuf,
    /// output file
    #[argh(positional, default = "PathBuf::from(\"trace.csv\")")]
    output: PathBuf,
}

impl CliArgs {
    fn calibration(&self) -> Result<CalibrationParams> {
        if let Some(path) = &self.calibration {
            return CalibrationParams::from_json_file(path)
                .with_context(|| format!("loading calibration '{}'", path.display()));
        }

        match (self.vdiv, self.tdiv, &self.sara) {
            (Some(vdiv), Some(tdiv), Some(sara)) => {
                Ok(CalibrationParams::from_instrument(vdiv, self.ofst, tdiv, sara)?)
            }
            _ => bail!("either --calibration or all of --vdiv, --tdiv and --sara are required"),
        }
    }

    fn detector(&self) -> DetectorConfig {
        let mut config = DetectorConfig::default();
        if let Some(guard) = self.guard {
            config.guard = guard;
        }
        if let Some(hysteresis) = self.hysteresis {
            config.hysteresis_counts = hysteresis;
        }
        config
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args: CliArgs = argh::from_env();
    let calib = args.calibration()?;
    let detector = args.detector();

    let input = match &args.command {
        Command::Info(a) => &a.input,
        Command::Pulses(a) => &a.input,
        Command::Trace(a) => &a.input,
    };
    let capture = Capture::load_file(input, calib)
        .with_context(|| format!("loading frame '{}'", input.display()))?;
    info!("Received data OK: {} samples", capture.len());

    match &args.command {
        Command::Info(_) => {
            let analysis = capture.analyze(&detector)?;
            print_capture_info(&capture, &analysis);
        }

        Command::Pulses(a) => {
            let analysis = capture.analyze(&detector)?;
            analysis
                .write_pulse_list(&a.output)
                .with_context(|| format!("writing pulse list '{}'", a.output.display()))?;
            info!(
                "Wrote {} pulses ({} transitions) to {}",
                analysis.pulses.len(),
                analysis.events.len(),
                a.output.display()
            );
        }

        Command::Trace(a) => {
            capture
                .write_trace_csv(&a.output)
                .with_context(|| format!("writing trace '{}'", a.output.display()))?;
            info!("Wrote {} samples to {}", capture.len(), a.output.display());
        }
    }

    Ok(())
}

fn print_capture_info(capture: &Capture, analysis: &PulseAnalysis) {
    let calib = &capture.calibration;
    let thresh = &analysis.threshold;

    println!("Capture Information");
    println!("===================");
    println!();
    println!("File: {}", capture.source);
    println!("Samples: {}", capture.len());
    println!();

    println!("Scaling:");
    println!("  Vertical: {} V/div, offset {} V", calib.volts_per_div, calib.vertical_offset);
    println!("  Horizontal: {} s/div", calib.time_per_div);
    println!(
        "  Sample interval: {:.3e} s ({:.3} MHz sample rate)",
        calib.sample_interval,
        calib.sample_rate() / 1e6
    );
    println!("  Capture start: {:.6e} s", calib.capture_start());
    println!("  Capture duration: {:.6e} s", capture.duration());
    println!();

    println!("Threshold:");
    println!(
        "  Max: {:.2}V, Min: {:.2}V, Threshold: {}, {:.2}V",
        calib.counts_to_volts(thresh.max as f64),
        calib.counts_to_volts(thresh.min as f64),
        thresh.threshold,
        calib.counts_to_volts(thresh.threshold)
    );
    println!("  Hysteresis: +/-{} counts", thresh.hysteresis);
    println!();

    println!("Pulses:");
    println!("  Transitions: {}", analysis.events.len());
    if let Some(last) = analysis.pulses.last() {
        println!("  Pulse count: {}", last.sequence_number);
    }
    for p in analysis.pulses.iter().take(6) {
        println!(
            "  {:9.2} ms {:8.0} us {:3} {: <5} {:6.2} V",
            p.start_time * 1e3,
            p.width * 1e6,
            p.sequence_number,
            p.level,
            p.voltage
        );
    }
}
