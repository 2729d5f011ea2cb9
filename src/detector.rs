//! The decision state machine (§4.8): learning phases, the candidate-beat
//! and noise-peak branches, search-back, T-wave discrimination, and the
//! emit protocol (§4.11). This is where the five filter stages and three
//! peak trackers converge into the single `process_sample` entry point.

use crate::consts::{GENERAL_DELAY, PT200MS, PT2000MS, PT360MS, PT4000MS};
use crate::filters::{DerivativeFilter, HpFilter, LpFilter, MvaIntegrator};
use crate::peaks::{BlankGate, MvaPeakDetector, RectPeakTracker};
use crate::rr::RrTracker;
use crate::state::{HrState, PtState};
use crate::threshold::{ThresholdF, ThresholdI};

#[cfg(feature = "log")]
macro_rules! qrs_trace {
    ($($arg:tt)*) => { log::trace!($($arg)*) };
}
#[cfg(not(feature = "log"))]
macro_rules! qrs_trace {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! qrs_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}
#[cfg(not(feature = "log"))]
macro_rules! qrs_debug {
    ($($arg:tt)*) => {};
}

/// A single-lead, 200 Hz, fixed-point QRS (R-peak) detector.
///
/// Owns every byte of its own state (§3, §9 "Global state → encapsulation");
/// multiple concurrent streams just need multiple `Detector` instances
/// (§5). Feed samples one at a time, in arrival order, to
/// [`process_sample`](Self::process_sample).
///
/// ```
/// use qrs_detect::Detector;
///
/// let mut det = Detector::new();
/// for _ in 0..1000 {
///     let delay = det.process_sample(0);
///     assert_eq!(delay, 0);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Detector {
    lp: LpFilter,
    hp: HpFilter,
    dr: DerivativeFilter,
    mva: MvaIntegrator,

    mva_peak: MvaPeakDetector,
    bp_peak: RectPeakTracker,
    dr_peak: RectPeakTracker,
    gate: BlankGate,

    th_i: ThresholdI,
    th_f: ThresholdF,
    rr: RrTracker,

    sb_cnt_i: i16,
    sb_peak_i: u16,
    sb_peak_bp: i16,
    sb_peak_dr: i16,

    st_mx_pk: u16,
    st_mean_pk: u16,
    st_mean_pk_bp: i16,

    old_peak_dr: i16,
    count_since_rr: i16,
    pt_state: PtState,

    lpf_val: i16,
    hpf_val: i16,
    drf_val: i16,
    sqf_val: u16,
    mva_val: u16,
}

impl Default for Detector {
    fn default() -> Self {
        Self {
            lp: LpFilter::default(),
            hp: HpFilter::default(),
            dr: DerivativeFilter::default(),
            mva: MvaIntegrator::default(),

            mva_peak: MvaPeakDetector::default(),
            bp_peak: RectPeakTracker::default(),
            dr_peak: RectPeakTracker::default(),
            gate: BlankGate::default(),

            th_i: ThresholdI::default(),
            th_f: ThresholdF::default(),
            rr: RrTracker::default(),

            sb_cnt_i: 0,
            sb_peak_i: 0,
            sb_peak_bp: 0,
            sb_peak_dr: 0,

            st_mx_pk: 0,
            st_mean_pk: 0,
            st_mean_pk_bp: 0,

            old_peak_dr: 0,
            count_since_rr: 0,
            pt_state: PtState::StartUp,

            lpf_val: 0,
            hpf_val: 0,
            drf_val: 0,
            sqf_val: 0,
            mva_val: 0,
        }
    }
}

impl Detector {
    /// `init()` (§6): builds a freshly initialized detector in [`PtState::StartUp`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-initializes all state in place, as if a fresh [`Detector::new`]
    /// had been built. Called automatically on stall recovery (§7) but
    /// also available for callers who want to reuse one allocation across
    /// streams.
    pub fn reset(&mut self) {
        *self = Self::default();
        qrs_debug!("qrs_detect: detector reset");
    }

    /// Consumes one ECG sample and returns the beat delay: 0 if no beat
    /// was detected this sample, otherwise the number of samples back from
    /// *now* that the R-peak occurred (§4.11). The caller computes the
    /// absolute sample index as `sample_count - delay`.
    pub fn process_sample(&mut self, x: i16) -> i16 {
        // §2: LP -> HP -> BP peak -> derivative -> DR peak -> square -> MVA -> MVA peak -> gate.
        self.lpf_val = self.lp.process(x);
        self.hpf_val = self.hp.process(self.lpf_val);
        self.bp_peak.update(self.hpf_val);

        self.drf_val = self.dr.process(self.hpf_val);
        self.dr_peak.update(self.drf_val);

        self.sqf_val = crate::filters::square(self.drf_val);
        self.mva_val = self.mva.process(self.sqf_val);

        let mva_candidate = self.mva_peak.process(self.mva_val);
        let peaki = self.gate.process(mva_candidate);

        self.count_since_rr = self.count_since_rr.saturating_add(1);
        if self.count_since_rr > PT4000MS {
            qrs_debug!("qrs_detect: stall recovery after {} samples", self.count_since_rr);
            self.reset();
            return 0;
        }

        match self.pt_state {
            PtState::StartUp | PtState::LearnPh1 => {
                self.run_learning_phase(peaki);
                0
            }
            PtState::LearnPh2 | PtState::Detecting => self.run_decision_phase(peaki),
        }
    }

    /// StartUp / LearnPh1 (§4.8): accumulate `st_mx_pk`/`st_mean_pk`/`st_mean_pk_bp`
    /// from post-gate peaks, then transition to LearnPh2 and seed the
    /// adaptive thresholds once 2 seconds have elapsed.
    fn run_learning_phase(&mut self, peaki: u16) {
        if peaki > 0 {
            if peaki > self.st_mx_pk {
                self.st_mx_pk = peaki;
            }
            if self.pt_state == PtState::StartUp {
                self.st_mean_pk = peaki;
                self.st_mean_pk_bp = self.bp_peak.best();
                self.pt_state = PtState::LearnPh1;
            } else {
                self.st_mean_pk = (self.st_mean_pk + peaki) / 2;
                self.st_mean_pk_bp = (self.st_mean_pk_bp + self.bp_peak.best()) / 2;
            }
        }

        if self.pt_state == PtState::LearnPh1 && self.count_since_rr >= PT2000MS {
            // Open question (§9): spkf is seeded from the *current*
            // best_peak_bp, not from the averaged st_mean_pk_bp — preserved
            // from the reference rather than "fixed".
            self.th_i.seed(self.st_mx_pk / 2, self.st_mean_pk / 8);
            self.th_f.seed(self.bp_peak.best() / 2, self.st_mean_pk_bp / 8);
            self.pt_state = PtState::LearnPh2;
            qrs_debug!("qrs_detect: LearnPh1 -> LearnPh2");
        }
    }

    /// LearnPh2 / Detecting (§4.8): candidate-beat vs. noise-peak
    /// classification, T-wave discrimination, and (only once `Detecting`)
    /// search-back for missed beats.
    fn run_decision_phase(&mut self, peaki: u16) -> i16 {
        let mut beat_delay = 0;

        if peaki > 0 {
            let best_bp = self.bp_peak.best();
            if peaki > self.th_i.th1 && best_bp > self.th_f.th1 {
                beat_delay = self.confirm_candidate_beat(peaki, best_bp);
            } else {
                self.classify_noise_peak(peaki, best_bp);
            }
        }

        if self.pt_state == PtState::Detecting {
            if let Some(delay) = self.try_search_back() {
                beat_delay = delay;
            }
        }

        beat_delay
    }

    fn confirm_candidate_beat(&mut self, peaki: u16, best_bp: i16) -> i16 {
        match self.pt_state {
            PtState::LearnPh2 => {
                // The first confirmed beat: thresholds update, but RR
                // buffers are not touched yet (§4.8).
                self.th_i.update(peaki, false);
                self.th_f.update(best_bp, false);
                self.start_new_beat();
                self.pt_state = PtState::Detecting;
                qrs_debug!("qrs_detect: LearnPh2 -> Detecting (first beat)");
                GENERAL_DELAY + PT200MS
            }
            PtState::Detecting => {
                let is_t_wave =
                    self.count_since_rr < PT360MS && self.dr_peak.best() < self.old_peak_dr / 4;
                if is_t_wave {
                    qrs_trace!("qrs_detect: T-wave rejected at count_since_rr={}", self.count_since_rr);
                    self.th_i.update(peaki, true);
                    self.th_f.update(best_bp, true);
                    0
                } else {
                    self.th_i.update(peaki, false);
                    self.th_f.update(best_bp, false);
                    self.rr.update(self.count_since_rr, &mut self.th_i, &mut self.th_f);
                    self.start_new_beat();
                    self.clear_search_back();
                    GENERAL_DELAY + PT200MS
                }
            }
            _ => unreachable!("run_decision_phase only runs in LearnPh2/Detecting"),
        }
    }

    fn classify_noise_peak(&mut self, peaki: u16, best_bp: i16) {
        self.th_i.update(peaki, true);
        self.th_f.update(best_bp, true);
        if peaki > self.sb_peak_i && self.count_since_rr >= PT360MS {
            self.sb_peak_i = peaki;
            self.sb_cnt_i = self.count_since_rr;
            self.sb_peak_bp = best_bp;
            self.sb_peak_dr = self.dr_peak.best();
        }
    }

    fn try_search_back(&mut self) -> Option<i16> {
        if self.count_since_rr > self.rr.rr_missed_l
            && self.sb_peak_i > self.th_i.th2
            && self.sb_peak_bp > self.th_f.th2
        {
            self.th_i.update(self.sb_peak_i, false);
            self.th_f.update(self.sb_peak_bp, false);
            self.rr.update(self.sb_cnt_i, &mut self.th_i, &mut self.th_f);

            let delay = (self.count_since_rr - self.sb_cnt_i) + GENERAL_DELAY + PT200MS;
            self.count_since_rr -= self.sb_cnt_i;
            self.old_peak_dr = self.sb_peak_dr;
            self.dr_peak.clear();
            self.bp_peak.clear();
            self.clear_search_back();
            qrs_debug!("qrs_detect: search-back promoted a beat, delay={delay}");
            Some(delay)
        } else {
            None
        }
    }

    /// Resets `count_since_rr` and snapshots `old_peak_dr` after a
    /// confirmed beat, common to both the first-beat and steady-state paths.
    fn start_new_beat(&mut self) {
        self.count_since_rr = 0;
        self.old_peak_dr = self.dr_peak.best();
        self.dr_peak.clear();
        self.bp_peak.clear();
    }

    fn clear_search_back(&mut self) {
        self.sb_cnt_i = 0;
        self.sb_peak_i = 0;
        self.sb_peak_bp = 0;
        self.sb_peak_dr = 0;
    }

    // -- Introspection accessors (§6) --

    /// Most recent LP filter output.
    pub fn lpf_val(&self) -> i16 {
        self.lpf_val
    }
    /// Most recent HP (band-pass) filter output.
    pub fn hpf_val(&self) -> i16 {
        self.hpf_val
    }
    /// Most recent derivative filter output.
    pub fn drf_val(&self) -> i16 {
        self.drf_val
    }
    /// Most recent squared sample.
    pub fn sqf_val(&self) -> u16 {
        self.sqf_val
    }
    /// Most recent moving-average integrator output.
    pub fn mva_val(&self) -> u16 {
        self.mva_val
    }
    /// Current integrated-signal primary threshold.
    pub fn th_i1(&self) -> u16 {
        self.th_i.th1
    }
    /// Current BP-signal primary threshold.
    pub fn th_f1(&self) -> i16 {
        self.th_f.th1
    }
    /// Current integrated-signal signal-level estimate.
    pub fn spki(&self) -> u16 {
        self.th_i.spki
    }
    /// Current integrated-signal noise-level estimate.
    pub fn npki(&self) -> u16 {
        self.th_i.npki
    }
    /// Current BP-signal signal-level estimate.
    pub fn spkf(&self) -> i16 {
        self.th_f.spkf
    }
    /// Current BP-signal noise-level estimate.
    pub fn npkf(&self) -> i16 {
        self.th_f.npkf
    }
    /// Current heart-rate regularity classification.
    pub fn hr_state(&self) -> HrState {
        self.rr.hr_state
    }
    /// Current decision state-machine stage.
    pub fn state(&self) -> PtState {
        self.pt_state
    }

    /// `short_time_hr(fs)` (§6): beats per minute from the "recent" RR mean
    /// (every RR interval, regular or not), at sample rate `fs`.
    pub fn short_time_hr(&self, fs: i32) -> i32 {
        60 * fs / self.rr.recent_rr_m as i32
    }

    /// `long_time_hr(fs)` (§6): beats per minute from the "selected" RR
    /// mean (only regular intervals), at sample rate `fs`.
    pub fn long_time_hr(&self, fs: i32) -> i32 {
        60 * fs / self.rr.rr_m as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_input_produces_no_beats_and_thresholds_never_leave_zero() {
        let mut det = Detector::new();
        for _ in 0..800 {
            assert_eq!(det.process_sample(0), 0);
        }
        // No MVA peak was ever seen on an all-zero stream, so StartUp never
        // advances to LearnPh1, and the LearnPh1 -> LearnPh2 transition
        // never fires either (§8 zero-input-silence law): state stays put.
        assert!(matches!(det.state(), PtState::StartUp | PtState::LearnPh1));
        assert_eq!(det.spki(), 0);
    }

    #[test]
    fn stall_recovery_resets_after_801_samples_of_silence() {
        let mut det = Detector::new();
        for _ in 0..801 {
            det.process_sample(0);
        }
        let fresh = Detector::new();
        assert_eq!(det.state(), fresh.state());
        assert_eq!(det.count_since_rr, fresh.count_since_rr);
        assert_eq!(det.spki(), fresh.spki());
    }

    #[test]
    fn reset_is_idempotent() {
        let mut a = Detector::new();
        a.reset();
        let mut b = Detector::new();
        b.reset();
        b.reset();
        assert_eq!(format!("{a:?}"), format!("{b:?}"));
    }

    #[test]
    fn invariants_hold_across_a_run() {
        let mut det = Detector::new();
        let mut n: i32 = 12345;
        for _ in 0..5000 {
            // Deterministic pseudo-noise in a plausible ECG ADC range.
            n = n.wrapping_mul(1103515245).wrapping_add(12345);
            let sample = ((n >> 16) % 2000) as i16;
            det.process_sample(sample);
            assert!(det.th_f.th2 == det.th_f.th1 / 2);
            assert_eq!(det.th_i.th2, det.th_i.th1 / 2);
            assert!(det.count_since_rr >= 0 && det.count_since_rr <= PT4000MS);
        }
    }

    fn feed_impulse_train(spacing: i16, repeats: usize) -> (Detector, Vec<i16>) {
        let mut det = Detector::new();
        let mut delays = Vec::new();
        for _ in 0..repeats {
            delays.push(det.process_sample(1000));
            for _ in 1..spacing {
                delays.push(det.process_sample(0));
            }
        }
        (det, delays)
    }

    #[test]
    fn regular_impulse_train_confirms_beats_and_reaches_detecting() {
        let (det, delays) = feed_impulse_train(200, 10);
        // At least one beat must have been confirmed at the reference
        // normal-detection delay (§4.11): GENERAL_DELAY + PT200MS = 78.
        assert!(delays.iter().any(|&d| d == GENERAL_DELAY + PT200MS));
        assert_eq!(det.state(), PtState::Detecting);
    }

    #[test]
    fn determinism_same_input_same_output_stream() {
        let make = || {
            let mut det = Detector::new();
            let mut out = Vec::new();
            for i in 0..2000i32 {
                let x = if i % 200 == 0 { 1000 } else { 0 };
                out.push(det.process_sample(x as i16));
            }
            out
        };
        assert_eq!(make(), make());
    }
}
