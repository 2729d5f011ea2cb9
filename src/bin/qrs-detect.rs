//! A CLI front-end for the `qrs_detect` library: reads a file of `i16`
//! samples, drives a [`Detector`](qrs_detect::Detector) over them one at a
//! time, and writes a per-sample CSV trace plus detected R-peak indices
//! (§6).

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use log::{debug, info};

use qrs_detect::io::{read_samples, CsvRow, CsvWriter};
use qrs_detect::Detector;

#[derive(Parser)]
#[command(name = "qrs-detect")]
#[command(about = "Fixed-point real-time QRS (R-peak) detector for 200 Hz ECG streams")]
struct Args {
    /// Input sample file, one i16 per line.
    input: PathBuf,

    /// Print each detected R-peak to stdout as it's found.
    #[arg(short, long)]
    verbose: bool,

    /// CSV output path. Defaults to `<input>.csv`.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("qrs-detect: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let output_path = args
        .output
        .unwrap_or_else(|| args.input.with_extension("csv"));

    info!("reading samples from {}", args.input.display());
    let samples = read_samples(&args.input)?;
    debug!("read {} samples", samples.len());

    let file = std::fs::File::create(&output_path)?;
    let mut writer = CsvWriter::new(std::io::BufWriter::new(file))?;

    let mut detector = Detector::new();
    let mut sample_count: i64 = 0;
    let mut beats = 0u64;

    for &sample in &samples {
        sample_count += 1;
        let delay = detector.process_sample(sample);

        let rbeat = if delay > 0 {
            let r_peak_index = sample_count - delay as i64;
            beats += 1;
            if args.verbose {
                println!("R-peak at sample {r_peak_index}");
            }
            r_peak_index
        } else {
            0
        };

        writer.write_row(&CsvRow {
            input: sample,
            lp: detector.lpf_val(),
            hp: detector.hpf_val(),
            derivative: detector.drf_val(),
            sqr: detector.sqf_val(),
            mva: detector.mva_val(),
            rbeat,
            th_i1: detector.th_i1(),
            signal_level: detector.spki(),
            noise_level: detector.npki(),
            th_f1: detector.th_f1(),
        })?;
    }

    info!(
        "processed {} samples, {} beats detected, wrote {}",
        sample_count,
        beats,
        output_path.display()
    );
    Ok(())
}
