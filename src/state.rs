//! State enums for the detector's learning/detecting state machine and
//! heart-rate regularity tracking.

/// Stage of the decision state machine (§4.8).
///
/// The detector always starts in [`StartUp`](PtState::StartUp) and walks
/// forward through the remaining states; there is no path back to an
/// earlier state except a full [`Detector::reset`](crate::Detector::reset)
/// (stall recovery or explicit re-init).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PtState {
    /// No post-gate peak has been seen yet since the last reset.
    #[default]
    StartUp,
    /// Accumulating `st_mx_pk`/`st_mean_pk`/`st_mean_pk_bp` from post-gate peaks.
    LearnPh1,
    /// Learning aggregates are seeded; thresholds are initialized but not yet
    /// confirmed by a first beat.
    LearnPh2,
    /// Steady-state operation: thresholds adapt from confirmed beats and
    /// noise peaks, search-back and T-wave discrimination are active.
    Detecting,
}

/// Heart-rate regularity, updated by [`RrTracker::update`](crate::rr::RrTracker::update)
/// each time an RR interval is observed (§4.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HrState {
    /// The most recent RR interval fell inside `[rr_low_l, rr_high_l]`.
    #[default]
    Regular,
    /// The most recent RR interval fell outside the regular band.
    Irregular,
}
