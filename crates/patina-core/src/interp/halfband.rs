//! Fixed 4x oversampler for the live processing path.
//!
//! Zero-stuffing upsampler and decimating downsampler sharing one
//! 31-tap linear-phase lowpass with cutoff near a quarter of the
//! oversampled Nyquist (i.e. just under the base-rate Nyquist). The same
//! filter serves as interpolation image filter and anti-aliasing filter,
//! and both directions are delay-compensated, so `down(up(x))` reproduces
//! a slowly varying `x` with no added latency.

extern crate alloc;
use alloc::vec;
use alloc::vec::Vec;

use super::design::kaiser_lowpass;
use super::fir::convolve_centered;

/// Oversampling factor of this interpolator.
pub const HALF_BAND_FACTOR: usize = 4;

/// Filter length. Short enough to stay cheap, long enough for ~80 dB
/// image rejection at the 0.118 cutoff.
const TAP_COUNT: usize = 31;

/// Normalized cutoff in cycles/sample at the oversampled rate. The ideal
/// interpolation cutoff for 4x is 0.125; the 5% pull-back leaves a
/// transition band inside the guard region.
const CUTOFF: f32 = 0.118;

const BETA: f32 = 8.6;

/// 4x up/down resampler pair.
///
/// All scratch is sized once at construction; `up` and `down` never
/// allocate, making the type safe to drive from a real-time callback.
pub struct HalfBand4x {
    taps: Vec<f32>,
    scratch: Vec<f32>,
}

impl HalfBand4x {
    /// Create a resampler able to handle blocks up to `max_block` input
    /// samples.
    #[must_use]
    pub fn new(max_block: usize) -> Self {
        Self {
            taps: kaiser_lowpass(TAP_COUNT, CUTOFF, BETA),
            scratch: vec![0.0; max_block * HALF_BAND_FACTOR],
        }
    }

    /// Upsample `input` by 4 into `out`.
    ///
    /// Writes `input.len() * 4` samples; any tail beyond that is left
    /// untouched. Inputs longer than the configured maximum are truncated.
    pub fn up(&mut self, input: &[f32], out: &mut [f32]) {
        let n = input
            .len()
            .min(self.scratch.len() / HALF_BAND_FACTOR)
            .min(out.len() / HALF_BAND_FACTOR);
        let up_n = n * HALF_BAND_FACTOR;

        // Zero-stuff, scaled by the factor to preserve energy.
        self.scratch[..up_n].fill(0.0);
        for (i, &x) in input.iter().enumerate().take(n) {
            self.scratch[i * HALF_BAND_FACTOR] = x * HALF_BAND_FACTOR as f32;
        }
        convolve_centered(&self.scratch[..up_n], &self.taps, &mut out[..up_n]);
    }

    /// Filter and decimate `input` by 4 into `out`.
    ///
    /// Odd remainders truncate to the nearest valid multiple of the
    /// factor.
    pub fn down(&mut self, input: &[f32], out: &mut [f32]) {
        let up_n = (input.len() / HALF_BAND_FACTOR) * HALF_BAND_FACTOR;
        let up_n = up_n.min(self.scratch.len());
        let n = (up_n / HALF_BAND_FACTOR).min(out.len());

        convolve_centered(&input[..up_n], &self.taps, &mut self.scratch[..up_n]);
        for (i, slot) in out.iter_mut().enumerate().take(n) {
            *slot = self.scratch[i * HALF_BAND_FACTOR];
        }
    }
}
