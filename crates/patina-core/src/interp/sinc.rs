//! High-quality 8x windowed-sinc oversampler.
//!
//! The offline/mastering mode: a long Kaiser-windowed sinc (β = 8.6,
//! 129 taps) with cutoff `0.5/8 × 0.95`. The upsampler is
//! delay-compensated; the downsampler applies the same filter causally
//! before decimation, so a round trip carries a fixed group delay of
//! `(taps − 1) / 2` samples at the oversampled rate. Callers that care
//! compensate using [`Sinc8x::latency_samples`].

extern crate alloc;
use alloc::vec;
use alloc::vec::Vec;

use super::design::kaiser_lowpass;
use super::fir::{convolve_causal, convolve_centered};

/// Oversampling factor of this interpolator.
pub const SINC_FACTOR: usize = 8;

/// Filter length; odd for a symmetric Type I design.
const TAP_COUNT: usize = 129;

/// Kaiser shape parameter.
const BETA: f32 = 8.6;

/// 8x up/down resampler pair.
pub struct Sinc8x {
    taps: Vec<f32>,
    scratch: Vec<f32>,
}

impl Sinc8x {
    /// Create a resampler able to handle blocks up to `max_block` input
    /// samples.
    #[must_use]
    pub fn new(max_block: usize) -> Self {
        let cutoff = 0.5 / SINC_FACTOR as f32 * 0.95;
        Self {
            taps: kaiser_lowpass(TAP_COUNT, cutoff, BETA),
            scratch: vec![0.0; max_block * SINC_FACTOR],
        }
    }

    /// Group delay of the round trip, in samples at the oversampled rate.
    #[must_use]
    pub fn latency_samples(&self) -> usize {
        (TAP_COUNT - 1) / 2
    }

    /// Upsample `input` by 8 into `out`.
    pub fn up(&mut self, input: &[f32], out: &mut [f32]) {
        let n = input
            .len()
            .min(self.scratch.len() / SINC_FACTOR)
            .min(out.len() / SINC_FACTOR);
        let up_n = n * SINC_FACTOR;

        self.scratch[..up_n].fill(0.0);
        for (i, &x) in input.iter().enumerate().take(n) {
            self.scratch[i * SINC_FACTOR] = x * SINC_FACTOR as f32;
        }
        convolve_centered(&self.scratch[..up_n], &self.taps, &mut out[..up_n]);
    }

    /// Anti-alias filter and decimate `input` by 8 into `out`.
    pub fn down(&mut self, input: &[f32], out: &mut [f32]) {
        let up_n = (input.len() / SINC_FACTOR) * SINC_FACTOR;
        let up_n = up_n.min(self.scratch.len());
        let n = (up_n / SINC_FACTOR).min(out.len());

        convolve_causal(&input[..up_n], &self.taps, &mut self.scratch[..up_n]);
        for (i, slot) in out.iter_mut().enumerate().take(n) {
            *slot = self.scratch[i * SINC_FACTOR];
        }
    }
}
