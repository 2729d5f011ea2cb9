//! Adaptive threshold updates (§4.9): the `SPKI`/`NPKI`/`TH_I1`/`TH_I2`
//! quartet tracking the integrated (MVA) signal, and its structurally
//! identical BP-side counterpart `SPKF`/`NPKF`/`TH_F1`/`TH_F2`.
//!
//! Both update rules are computed in `i32` and cast back down to the
//! field's declared width (`u16` for the MVA side, `i16` for the BP side).
//! This mirrors how the reference's C promotes 16-bit operands to `int`
//! for the subtraction/division and stores the truncated result back —
//! it keeps the update free of Rust overflow panics without changing the
//! arithmetic the spec specifies.

/// The integrated-signal (MVA) threshold quartet.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThresholdI {
    /// Running estimate of the signal (beat) peak level.
    pub spki: u16,
    /// Running estimate of the noise peak level.
    pub npki: u16,
    /// Primary detection threshold: `npki + (spki - npki) / 4`.
    pub th1: u16,
    /// Search-back threshold: `th1 / 2`.
    pub th2: u16,
}

impl ThresholdI {
    fn recompute(&mut self) {
        let npki = self.npki as i32;
        let spki = self.spki as i32;
        self.th1 = (npki + (spki - npki) / 4) as u16;
        self.th2 = (self.th1 as i32 / 2) as u16;
    }

    /// `update_th_i(peak, noise)` (§4.9).
    pub fn update(&mut self, peak: u16, noise: bool) {
        if noise {
            let npki = self.npki as i32;
            self.npki = (npki - npki / 8 + (peak as i32) / 8) as u16;
        } else {
            let spki = self.spki as i32;
            self.spki = (spki - spki / 8 + (peak as i32) / 8) as u16;
        }
        self.recompute();
    }

    /// Seeds `spki`/`npki` at the LearnPh1 → LearnPh2 transition (§4.8) and
    /// recomputes `th1`/`th2` to restore the invariant `th1 = npki + (spki - npki)/4`.
    pub fn seed(&mut self, spki: u16, npki: u16) {
        self.spki = spki;
        self.npki = npki;
        self.recompute();
    }

    /// Halves `th1` (and, to preserve the `th2 = th1/2` invariant, `th2`
    /// along with it) on an irregular RR interval (§4.10).
    pub fn halve_th1(&mut self) {
        self.th1 >>= 1;
        self.th2 = self.th1 / 2;
    }
}

/// The BP-signal threshold quartet — structurally identical to [`ThresholdI`]
/// but over signed 16-bit fields (§4.9: "In the BP peak detector... the
/// field is semantically the BP signal", preserved per the Open Questions).
#[derive(Debug, Clone, Copy, Default)]
pub struct ThresholdF {
    /// Running estimate of the BP signal (beat) peak level.
    pub spkf: i16,
    /// Running estimate of the BP noise peak level.
    pub npkf: i16,
    /// Primary detection threshold: `npkf + (spkf - npkf) / 4`.
    pub th1: i16,
    /// Search-back threshold: `th1 / 2`.
    pub th2: i16,
}

impl ThresholdF {
    fn recompute(&mut self) {
        let npkf = self.npkf as i32;
        let spkf = self.spkf as i32;
        self.th1 = (npkf + (spkf - npkf) / 4) as i16;
        self.th2 = (self.th1 as i32 / 2) as i16;
    }

    /// `update_th_f(peak, noise)` (§4.9).
    pub fn update(&mut self, peak: i16, noise: bool) {
        if noise {
            let npkf = self.npkf as i32;
            self.npkf = (npkf - npkf / 8 + (peak as i32) / 8) as i16;
        } else {
            let spkf = self.spkf as i32;
            self.spkf = (spkf - spkf / 8 + (peak as i32) / 8) as i16;
        }
        self.recompute();
    }

    /// Seeds `spkf`/`npkf` at the LearnPh1 → LearnPh2 transition (§4.8).
    pub fn seed(&mut self, spkf: i16, npkf: i16) {
        self.spkf = spkf;
        self.npkf = npkf;
        self.recompute();
    }

    /// Halves `th1`/`th2` on an irregular RR interval (§4.10).
    pub fn halve_th1(&mut self) {
        self.th1 >>= 1;
        self.th2 = self.th1 / 2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_i_invariant_holds_after_update() {
        let mut t = ThresholdI::default();
        t.seed(100, 10);
        assert_eq!(t.th2, t.th1 / 2);
        t.update(200, false);
        assert_eq!(t.th2, t.th1 / 2);
        t.update(5, true);
        assert_eq!(t.th2, t.th1 / 2);
    }

    #[test]
    fn threshold_i_noise_update_moves_npki_not_spki() {
        let mut t = ThresholdI::default();
        t.seed(1000, 100);
        let spki_before = t.spki;
        t.update(50, true);
        assert_eq!(t.spki, spki_before);
        assert_ne!(t.npki, 100);
    }

    #[test]
    fn threshold_f_signal_update_moves_spkf_not_npkf() {
        let mut t = ThresholdF::default();
        t.seed(1000, 100);
        let npkf_before = t.npkf;
        t.update(2000, false);
        assert_eq!(t.npkf, npkf_before);
        assert_ne!(t.spkf, 1000);
    }

    #[test]
    fn halving_preserves_th2_invariant() {
        let mut t = ThresholdI::default();
        t.seed(800, 80);
        t.halve_th1();
        assert_eq!(t.th2, t.th1 / 2);
    }
}
