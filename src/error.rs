//! The crate's only fallible surface: reading a sample file and writing
//! the CSV trace (§6, §7). `Detector::process_sample` itself stays
//! infallible — the core has exactly two failure modes (stall recovery,
//! saturation) and neither is surfaced as an error (§7).

use std::path::PathBuf;

/// Errors from the CLI/file-I/O layer. This is a `std`-only type: it
/// carries `PathBuf`/`std::io::Error`, which have no `no_std` equivalent.
#[derive(Debug, thiserror::Error)]
pub enum QrsIoError {
    /// The input sample file could not be opened.
    #[error("could not open input file {path}: {source}")]
    Open {
        /// The path that could not be opened.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A line of the input file was not a valid `i16` sample.
    #[error("line {line}: not a valid i16 sample: {text:?}")]
    BadSample {
        /// 1-indexed line number in the input file.
        line: usize,
        /// The offending token.
        text: String,
    },

    /// The CSV output could not be written.
    #[error("could not write CSV output: {0}")]
    Write(#[from] std::io::Error),
}
