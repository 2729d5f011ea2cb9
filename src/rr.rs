//! RR-interval tracking and heart-rate regularity (§4.10).

use crate::consts::{
    RR_BUF_LEN, RR_HIGH_STARTUP, RR_LOW_STARTUP, RR_MISSED_STARTUP, RR_STARTUP_INTERVAL,
    RR_STARTUP_SUM,
};
use crate::state::HrState;
use crate::threshold::{ThresholdF, ThresholdI};

/// The two 8-entry rolling RR-interval buffers, their sums, the derived
/// acceptance/missed-beat limits, and the current [`HrState`].
#[derive(Debug, Clone, Copy)]
pub struct RrTracker {
    buf1: [i16; RR_BUF_LEN],
    buf2: [i16; RR_BUF_LEN],
    head1: usize,
    head2: usize,
    sum1: i32,
    sum2: i32,

    /// Mean of the last 8 RR intervals regardless of regularity.
    pub recent_rr_m: i16,
    /// Mean of the last 8 RR intervals that fell within the regular band.
    pub rr_m: i16,
    /// Lower bound of the regular-RR acceptance band.
    pub rr_low_l: i16,
    /// Upper bound of the regular-RR acceptance band.
    pub rr_high_l: i16,
    /// `count_since_rr` above which search-back fires.
    pub rr_missed_l: i16,
    /// Whether the most recent RR interval was regular.
    pub hr_state: HrState,
}

impl Default for RrTracker {
    fn default() -> Self {
        Self {
            buf1: [RR_STARTUP_INTERVAL; RR_BUF_LEN],
            buf2: [RR_STARTUP_INTERVAL; RR_BUF_LEN],
            head1: 0,
            head2: 0,
            sum1: RR_STARTUP_SUM,
            sum2: RR_STARTUP_SUM,
            recent_rr_m: RR_STARTUP_INTERVAL,
            rr_m: RR_STARTUP_INTERVAL,
            rr_low_l: RR_LOW_STARTUP,
            rr_high_l: RR_HIGH_STARTUP,
            rr_missed_l: RR_MISSED_STARTUP,
            hr_state: HrState::Regular,
        }
    }
}

impl RrTracker {
    /// `update_rr(qrs)` (§4.10): records a new RR interval, always into the
    /// "recent" buffer, and into the "selected" buffer too when it falls
    /// inside the current regular band; recomputes the acceptance/missed
    /// limits and `hr_state` accordingly, halving `th_i1`/`th_f1` on an
    /// irregular interval.
    pub fn update(&mut self, qrs: i16, th_i: &mut ThresholdI, th_f: &mut ThresholdF) {
        self.sum1 += (qrs - self.buf1[self.head1]) as i32;
        self.buf1[self.head1] = qrs;
        self.head1 = (self.head1 + 1) % RR_BUF_LEN;
        self.recent_rr_m = (self.sum1 / RR_BUF_LEN as i32) as i16;

        if qrs >= self.rr_low_l && qrs <= self.rr_high_l {
            self.sum2 += (qrs - self.buf2[self.head2]) as i32;
            self.buf2[self.head2] = qrs;
            self.head2 = (self.head2 + 1) % RR_BUF_LEN;
            self.rr_m = (self.sum2 / RR_BUF_LEN as i32) as i16;

            let recent = self.recent_rr_m as i32;
            self.rr_low_l = (recent - (recent * 2) / 25) as i16;
            self.rr_high_l = (recent + (recent * 4) / 25) as i16;
            let rr_m = self.rr_m as i32;
            self.rr_missed_l = (rr_m + (rr_m * 33) / 50) as i16;
            self.hr_state = HrState::Regular;
        } else {
            let recent = self.recent_rr_m as i32;
            self.rr_missed_l = (recent + (recent * 33) / 50) as i16;
            th_i.halve_th1();
            th_f.halve_th1();
            self.hr_state = HrState::Irregular;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_values_match_spec() {
        let rr = RrTracker::default();
        assert_eq!(rr.rr_low_l, 184);
        assert_eq!(rr.rr_high_l, 232);
        assert_eq!(rr.rr_missed_l, 332);
        assert_eq!(rr.rr_m, 200);
        assert_eq!(rr.recent_rr_m, 200);
        assert_eq!(rr.hr_state, HrState::Regular);
    }

    #[test]
    fn regular_interval_keeps_regular_state() {
        let mut rr = RrTracker::default();
        let mut ti = ThresholdI::default();
        let mut tf = ThresholdF::default();
        rr.update(200, &mut ti, &mut tf);
        assert_eq!(rr.hr_state, HrState::Regular);
        assert_eq!(rr.recent_rr_m, 200);
    }

    #[test]
    fn out_of_band_interval_flags_irregular_and_halves_thresholds() {
        let mut rr = RrTracker::default();
        let mut ti = ThresholdI::default();
        ti.seed(1000, 100);
        let mut tf = ThresholdF::default();
        tf.seed(1000, 100);
        let th1_before = ti.th1;
        rr.update(350, &mut ti, &mut tf);
        assert_eq!(rr.hr_state, HrState::Irregular);
        assert_eq!(ti.th1, th1_before >> 1);
        assert_eq!(ti.th2, ti.th1 / 2);
    }
}
