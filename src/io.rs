//! Sample-file reading and CSV instrumentation output (§6). This is the
//! "external collaborator" the spec calls out as out of scope for the
//! core algorithm — it exists only to feed samples into a [`crate::Detector`]
//! and to record its per-sample outputs, and carries no detection logic of
//! its own.
//!
//! `std`-only: no-`std` targets have no filesystem.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::QrsIoError;

/// The fixed CSV header the spec requires, one row per input sample.
pub const CSV_HEADER: &str =
    "Input,LPFilter,HPFilter,DerivativeF,SQRFilter,MVAFilter,RBeat,RunningThI1,SignalLevel,NoiseLevel,RunningThF";

/// Reads one `i16` sample per line (whitespace-separated, first token used)
/// from `path`. Blank lines are skipped.
pub fn read_samples(path: &Path) -> Result<Vec<i16>, QrsIoError> {
    let text = fs::read_to_string(path).map_err(|source| QrsIoError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut samples = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let Some(token) = line.split_whitespace().next() else {
            continue;
        };
        let sample = token.parse::<i16>().map_err(|_| QrsIoError::BadSample {
            line: idx + 1,
            text: token.to_string(),
        })?;
        samples.push(sample);
    }
    Ok(samples)
}

/// One instrumentation row: the raw input sample plus every per-sample
/// intermediate the CSV header names.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvRow {
    /// The raw input sample.
    pub input: i16,
    /// Low-pass filter output.
    pub lp: i16,
    /// High-pass filter output.
    pub hp: i16,
    /// Derivative filter output.
    pub derivative: i16,
    /// Squared derivative output.
    pub sqr: u16,
    /// Moving-average integrator output.
    pub mva: u16,
    /// Absolute sample index of a detected R-peak this sample, or 0.
    pub rbeat: i64,
    /// Current `TH_I1` value.
    pub th_i1: u16,
    /// Current `SPKI` (signal level) value.
    pub signal_level: u16,
    /// Current `NPKI` (noise level) value.
    pub noise_level: u16,
    /// Current `TH_F1` value.
    pub th_f1: i16,
}

/// Writes [`CSV_HEADER`] followed by one line per row, to any `Write` sink.
pub struct CsvWriter<W: Write> {
    inner: W,
}

impl<W: Write> CsvWriter<W> {
    /// Wraps `inner` and immediately writes the header line.
    pub fn new(mut inner: W) -> Result<Self, QrsIoError> {
        writeln!(inner, "{CSV_HEADER}")?;
        Ok(Self { inner })
    }

    /// Writes one data row.
    pub fn write_row(&mut self, row: &CsvRow) -> Result<(), QrsIoError> {
        writeln!(
            self.inner,
            "{},{},{},{},{},{},{},{},{},{},{}",
            row.input,
            row.lp,
            row.hp,
            row.derivative,
            row.sqr,
            row.mva,
            row.rbeat,
            row.th_i1,
            row.signal_level,
            row.noise_level,
            row.th_f1
        )?;
        Ok(())
    }
}
