//! Content-adaptive oversampling switch.
//!
//! Oversampling buys alias suppression that quiet material does not need.
//! This wrapper tracks an exponentially decaying envelope of the stereo
//! input and routes hot blocks through the 4x path; everything else runs
//! the nonlinear stage at base rate. The decision looks at the current
//! *and* previous block's envelope (one block of hysteresis), so the
//! path never flips in the middle of a decaying transient, which would be
//! audible as a mode-switch click at the block boundary.

use super::halfband::{HALF_BAND_FACTOR, HalfBand4x};

/// Oversampling factor when the high-rate path is engaged.
pub const ADAPTIVE_FACTOR: usize = HALF_BAND_FACTOR;

/// Envelope level above which the oversampled path engages.
const ENGAGE_THRESHOLD: f32 = 0.2;

/// Per-sample envelope decay.
const ENVELOPE_DECAY: f32 = 0.98;

/// Envelope-gated 4x oversampler.
pub struct Adaptive4x {
    resampler: HalfBand4x,
    prev_envelope: f32,
    engaged: bool,
}

impl Adaptive4x {
    /// Create a switch able to handle blocks up to `max_block` input
    /// samples.
    #[must_use]
    pub fn new(max_block: usize) -> Self {
        Self {
            resampler: HalfBand4x::new(max_block),
            prev_envelope: 0.0,
            engaged: false,
        }
    }

    /// Whether the last processed block ran through the oversampled path.
    #[must_use]
    pub fn engaged(&self) -> bool {
        self.engaged
    }

    /// Reset the envelope tracker.
    pub fn reset(&mut self) {
        self.prev_envelope = 0.0;
        self.engaged = false;
    }

    /// Process one stereo block in place.
    ///
    /// `shape` receives either the oversampled buffers (hot signal) or the
    /// original block buffers (quiet signal) and must process them in
    /// place. `up_l`/`up_r` are caller-owned scratch of at least
    /// `4 × block` samples.
    pub fn process(
        &mut self,
        left: &mut [f32],
        right: &mut [f32],
        up_l: &mut [f32],
        up_r: &mut [f32],
        mut shape: impl FnMut(&mut [f32], &mut [f32]),
    ) {
        let n = left.len().min(right.len());

        let mut envelope = 0.0f32;
        for i in 0..n {
            let level = left[i].abs() + right[i].abs();
            envelope = (envelope * ENVELOPE_DECAY).max(level);
        }
        let engage = envelope > ENGAGE_THRESHOLD || self.prev_envelope > ENGAGE_THRESHOLD;
        self.prev_envelope = envelope;
        self.engaged = engage;

        if engage {
            let up_n = n * ADAPTIVE_FACTOR;
            self.resampler.up(&left[..n], &mut up_l[..up_n]);
            self.resampler.up(&right[..n], &mut up_r[..up_n]);
            shape(&mut up_l[..up_n], &mut up_r[..up_n]);
            self.resampler.down(&up_l[..up_n], &mut left[..n]);
            self.resampler.down(&up_r[..up_n], &mut right[..n]);
        } else {
            shape(&mut left[..n], &mut right[..n]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    extern crate alloc;
    use alloc::vec;
    use alloc::vec::Vec;

    fn silence(n: usize) -> Vec<f32> {
        vec![0.0; n]
    }

    fn burst(n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| 0.5 * libm::sinf(i as f32 * 2.0 * core::f32::consts::PI * 1000.0 / 48000.0))
            .collect()
    }

    #[test]
    fn test_hysteresis_holds_one_extra_block() {
        let n = 128;
        let mut adaptive = Adaptive4x::new(n);
        let mut up_l = vec![0.0f32; n * 4];
        let mut up_r = vec![0.0f32; n * 4];

        let mut run = |l: &mut Vec<f32>, r: &mut Vec<f32>, adaptive: &mut Adaptive4x| {
            adaptive.process(l, r, &mut up_l, &mut up_r, |_, _| {});
        };

        // silence -> disengaged
        let (mut l, mut r) = (silence(n), silence(n));
        run(&mut l, &mut r, &mut adaptive);
        assert!(!adaptive.engaged());

        // loud transient -> engaged
        let (mut l, mut r) = (burst(n), burst(n));
        run(&mut l, &mut r, &mut adaptive);
        assert!(adaptive.engaged(), "loud block must engage oversampling");

        // first silent block after the transient -> still engaged
        let (mut l, mut r) = (silence(n), silence(n));
        run(&mut l, &mut r, &mut adaptive);
        assert!(adaptive.engaged(), "hysteresis must hold one block");

        // second silent block -> disengaged
        let (mut l, mut r) = (silence(n), silence(n));
        run(&mut l, &mut r, &mut adaptive);
        assert!(!adaptive.engaged());
    }

    #[test]
    fn test_quiet_path_is_identity_for_noop_shaper() {
        let n = 64;
        let mut adaptive = Adaptive4x::new(n);
        let mut up_l = vec![0.0f32; n * 4];
        let mut up_r = vec![0.0f32; n * 4];

        // Quiet signal below the threshold.
        let mut l: Vec<f32> = (0..n).map(|i| 0.05 * libm::sinf(i as f32 * 0.2)).collect();
        let mut r = l.clone();
        let orig = l.clone();
        adaptive.process(&mut l, &mut r, &mut up_l, &mut up_r, |_, _| {});
        assert!(!adaptive.engaged());
        assert_eq!(l, orig, "bypass path must not touch the signal");
    }

    #[test]
    fn test_envelope_decays_within_block() {
        // A lone spike at the start of a long block decays below the
        // threshold by block end, but the block itself still engages.
        let n = 256;
        let mut adaptive = Adaptive4x::new(n);
        let mut up_l = vec![0.0f32; n * 4];
        let mut up_r = vec![0.0f32; n * 4];

        let mut l = silence(n);
        l[0] = 1.0;
        let mut r = silence(n);
        adaptive.process(&mut l, &mut r, &mut up_l, &mut up_r, |_, _| {});
        assert!(adaptive.engaged());
        // 1.0 * 0.98^255 is far below the threshold, so the *next* silent
        // block disengages only because of hysteresis, and the one after
        // that is clean.
        let (mut l, mut r) = (silence(n), silence(n));
        adaptive.process(&mut l, &mut r, &mut up_l, &mut up_r, |_, _| {});
        assert!(adaptive.engaged(), "hysteresis block");
        let (mut l, mut r) = (silence(n), silence(n));
        adaptive.process(&mut l, &mut r, &mut up_l, &mut up_r, |_, _| {});
        assert!(!adaptive.engaged());
    }
}
