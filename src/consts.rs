//! Constants shared across the QRS detection pipeline.
//!
//! These are the 200 Hz-specific constants baked into the reference
//! algorithm (the crate's Non-goals exclude sample-rate adaptation).
//! Every stage of the pipeline (`filters`, `peaks`, `threshold`, `rr`,
//! `detector`) reads its timing and clamp constants from here rather than
//! re-deriving them, so the 200 Hz assumption lives in exactly one place.

/// 200 ms of samples at 200 Hz — the blank-time gate window.
pub const PT200MS: i16 = 40;
/// 360 ms of samples at 200 Hz — the T-wave discrimination refractory period.
pub const PT360MS: i16 = 72;
/// 1000 ms of samples at 200 Hz — one second, the RR startup default.
pub const PT1000MS: i16 = 200;
/// 2000 ms of samples at 200 Hz — the end of the learning phase.
pub const PT2000MS: i16 = 400;
/// 4000 ms of samples at 200 Hz — the stall-recovery threshold.
pub const PT4000MS: i16 = 800;

/// Cumulative filter-group delay from ADC input to the MVA peak (5 + 16 + 2 + 15).
pub const GENERAL_DELAY: i16 = 38;

/// Size of the LP filter's ring buffer.
pub const LP_BUF_LEN: usize = 12;
/// Size of the HP filter's ring buffer.
pub const HP_BUF_LEN: usize = 32;
/// Size of the derivative filter's tap line.
pub const DR_BUF_LEN: usize = 4;
/// Size of the moving-average integrator's ring buffer.
pub const MVA_BUF_LEN: usize = 30;
/// Size of each RR-interval rolling buffer.
pub const RR_BUF_LEN: usize = 8;

/// Squaring stage: inputs whose magnitude exceeds this saturate the output to `0xFFFF`.
pub const SQR_LIM_VAL: i32 = 256;
/// Squaring stage: hard output ceiling after squaring.
pub const SQR_LIM_OUT: u16 = 30_000;
/// MVA stage: hard output ceiling after normalization.
pub const MVA_LIM_VAL: u16 = 32_000;

/// Startup value for both RR rolling buffers: 1 second at 200 Hz.
pub const RR_STARTUP_INTERVAL: i16 = PT1000MS;
/// Startup value for `rr1_sum`/`rr2_sum`: `200 << 3`, the sum of 8 entries of 200.
pub const RR_STARTUP_SUM: i32 = (RR_STARTUP_INTERVAL as i32) << 3;

/// Startup `rr_low_l`: 92% of the 200-sample default interval.
pub const RR_LOW_STARTUP: i16 = 184;
/// Startup `rr_high_l`: 116% of the 200-sample default interval.
pub const RR_HIGH_STARTUP: i16 = 232;
/// Startup `rr_missed_l`: 166% of the 200-sample default interval.
pub const RR_MISSED_STARTUP: i16 = 332;
