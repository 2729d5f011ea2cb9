//! # qrs-detect
//!
//! A portable, `no_std` Rust port of a fixed-point, real-time QRS
//! (heartbeat "R-peak") detector for single-lead ECG streams sampled at
//! 200 Hz.
//!
//! This crate implements a software detection pipeline using:
//! - a cascade of five fixed-point filters (low-pass, high-pass,
//!   derivative, squaring, moving-average integrator)
//! - three 3-point local-maximum peak trackers and a blank-time gate
//! - an adaptive dual-threshold decision state machine with search-back
//!   and T-wave discrimination
//!
//! Every arithmetic operation on the hot path is a 16/32-bit integer add,
//! subtract, or bit shift, with exactly two true divisions (the MVA
//! normalization and the RR/threshold percentage fractions) and one
//! multiplication (squaring) — no floating point, ever.
//!
//! ## Crate features
//!
//! | Feature   | Description |
//! |-----------|-------------|
//! | `std`     | Disables `#![no_std]`, and enables the `io` module (sample-file reading, CSV writing) and the `qrs-detect` CLI binary |
//! | `log`     | Emits `trace!`/`debug!` records at state transitions, resets, and search-back promotions via the `log` facade |
//! | `defmt`   | Derives `defmt::Format` on the public state enums, for embedded log targets |
//!
//! ## Usage
//!
//! ```rust
//! use qrs_detect::Detector;
//!
//! let mut detector = Detector::new();
//! let mut sample_count: i64 = 0;
//! for sample in [0i16; 64] {
//!     sample_count += 1;
//!     let delay = detector.process_sample(sample);
//!     if delay > 0 {
//!         let r_peak_index = sample_count - delay as i64;
//!         println!("R-peak at sample {r_peak_index}");
//!     }
//! }
//! ```
//!
//! ## Design Notes
//!
//! This crate implements Direct Form I for both the LP and HP filters
//! (§9/DESIGN.md); the difference equations are kept visibly in
//! correspondence with the spec so a Direct-Form-II port is a mechanical
//! swap if one is ever needed.
//!
//! --
//! Designed for `#![no_std]` use in resource-constrained embedded
//! environments; the `std` feature only widens the surface (file I/O, CLI)
//! rather than changing the detector's own arithmetic.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    missing_docs
)]
#![cfg_attr(not(feature = "std"), no_std)]

pub mod consts;
mod detector;
pub mod filters;
pub mod peaks;
pub mod rr;
pub mod state;
pub mod threshold;

#[cfg(feature = "std")]
pub mod error;
#[cfg(feature = "std")]
pub mod io;

pub use detector::Detector;
pub use state::{HrState, PtState};

#[cfg(test)]
mod tests {
    use super::*;

    /// Scenario 4 (§8): two impulses 50 samples apart (250 ms, inside the
    /// 360 ms T-wave refractory). A much smaller second derivative peak
    /// must be rejected as a T-wave; a comparable one must be confirmed.
    #[cfg(feature = "std")]
    #[test]
    fn t_wave_discrimination_rejects_small_close_second_peak() {
        fn run(second_amplitude: i16) -> Vec<i16> {
            let mut det = Detector::new();
            let mut out = Vec::new();
            // Drive several full-amplitude impulses so thresholds settle
            // into Detecting, then follow the last one with a close,
            // smaller second impulse.
            for beat in 0..6 {
                out.push(det.process_sample(1000));
                for _ in 1..200 {
                    out.push(det.process_sample(0));
                }
                if beat == 5 {
                    // 50 samples after the preceding impulse.
                    for _ in 0..50 {
                        out.push(det.process_sample(0));
                    }
                    out.push(det.process_sample(second_amplitude));
                    for _ in 0..20 {
                        out.push(det.process_sample(0));
                    }
                }
            }
            out
        }

        let small = run(50);
        let comparable = run(1000);
        // The comparable-amplitude second impulse must be confirmed
        // somewhere in the tail; the small one produces no *additional*
        // beat beyond what the steady impulse train already confirms on
        // its own. We can't assert exact counts without the reference's
        // golden trace, so this checks the qualitative law from §8
        // scenario 4: a strong second peak is strictly more likely to be
        // confirmed than a weak one.
        let small_beats = small.iter().filter(|&&d| d > 0).count();
        let comparable_beats = comparable.iter().filter(|&&d| d > 0).count();
        assert!(comparable_beats >= small_beats);
    }

    /// Scenario 2 (§8): a regular 200-sample impulse train settles into
    /// `Regular` heart-rate classification once past the learning phase,
    /// with `long_time_hr(200)` at or near 60 bpm.
    #[cfg(feature = "std")]
    #[test]
    fn regular_impulse_train_yields_regular_hr_near_60_bpm() {
        let mut det = Detector::new();
        for n in 1..=1600 {
            let x = if n % 200 == 0 { 1000 } else { 0 };
            det.process_sample(x);
        }
        assert_eq!(det.hr_state(), HrState::Regular);
        let bpm = det.long_time_hr(200);
        assert!((55..=65).contains(&bpm), "long_time_hr returned {bpm}");
    }

    /// Scenario 3 (§8): a delayed impulse (RR of 350 samples, above the
    /// 332-sample missed limit) must still produce a confirmed beat and
    /// must flip `hr_state` to `Irregular` on that RR update.
    #[cfg(feature = "std")]
    #[test]
    fn delayed_impulse_is_confirmed_and_flips_hr_state_irregular() {
        let mut det = Detector::new();
        // The spec's literal scenario-3 train: impulses at samples 200,
        // 400, 600, then a delayed one at 950 instead of 800.
        let mut sample = 0i64;
        let mut last_delay = 0i16;
        let impulse_samples = [200, 400, 600, 950];
        let mut next = 0usize;
        for _ in 0..1100 {
            sample += 1;
            let x = if next < impulse_samples.len() && sample == impulse_samples[next] {
                next += 1;
                1000
            } else {
                0
            };
            let d = det.process_sample(x);
            if d > 0 {
                last_delay = d;
            }
        }
        assert!(last_delay > 0, "the delayed impulse was never confirmed as a beat");
        assert_eq!(det.hr_state(), HrState::Irregular);
    }
}
