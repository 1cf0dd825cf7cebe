//! Rational sample-rate conversion for the offline analyzer.
//!
//! Upsample by P (zero insertion), lowpass at `min(1/P, 1/Q)` normalized
//! with a Blackman-windowed sinc, downsample by Q. Used to bring
//! arbitrary-rate reference material to the fixed 48 kHz analysis rate;
//! a rate mismatch is never an error, just a conversion.
//!
//! Reference: R. E. Crochiere and L. R. Rabiner, *Multirate Digital
//! Signal Processing*, Prentice Hall, 1983, Chapter 2.

use std::f32::consts::PI;

/// Fixed analysis rate all reference material is converted to.
pub const ANALYSIS_RATE: f32 = 48000.0;

/// Windowed-sinc lowpass design (Blackman window), unity DC gain.
///
/// `cutoff` is normalized to the range (0, 1) where 1 is Nyquist.
pub fn design_lowpass(num_taps: usize, cutoff: f32) -> Vec<f32> {
    if num_taps == 0 {
        return Vec::new();
    }
    let m = num_taps - 1;
    let mut coeffs = Vec::with_capacity(num_taps);
    for n in 0..num_taps {
        let x = n as f32 - m as f32 / 2.0;
        let sinc = if x.abs() < 1e-7 {
            cutoff
        } else {
            (PI * cutoff * x).sin() / (PI * x)
        };
        let window = if m == 0 {
            1.0
        } else {
            let phase = 2.0 * PI * n as f32 / m as f32;
            0.42 - 0.5 * phase.cos() + 0.08 * (2.0 * phase).cos()
        };
        coeffs.push(sinc * window);
    }
    let sum: f32 = coeffs.iter().sum();
    if sum.abs() > 1e-10 {
        for c in coeffs.iter_mut() {
            *c /= sum;
        }
    }
    coeffs
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

/// Resample by the rational factor `up / down`.
///
/// Conceptually: zero-stuff by `up`, lowpass at `min(1/up, 1/down)`
/// normalized, keep every `down`-th sample. The implementation is
/// polyphase: only the samples that survive decimation are ever
/// computed, so the cost per output sample is `taps / up` multiplies
/// regardless of how large the intermediate rate would be.
///
/// The factors are reduced by their GCD first; a unity ratio returns the
/// input unchanged.
#[must_use]
pub fn resample(signal: &[f32], up: usize, down: usize) -> Vec<f32> {
    assert!(up >= 1 && down >= 1, "resample factors must be >= 1");
    let g = gcd(up, down);
    let (up, down) = (up / g, down / g);
    if up == 1 && down == 1 {
        return signal.to_vec();
    }

    // Single lowpass serving as both image and anti-aliasing filter, with
    // a 10% guard band below the tighter of the two Nyquists.
    let worst = up.max(down);
    let cutoff = 0.9 / worst as f32;
    let num_taps = 8 * worst * 10 + 1;
    let taps = design_lowpass(num_taps, cutoff);
    let half = (num_taps - 1) / 2;

    let out_len = signal.len() * up / down;
    let mut out = Vec::with_capacity(out_len);
    for j in 0..out_len {
        // Index of this output in the virtual zero-stuffed stream, with
        // the filter's group delay folded in.
        let center = j * down + half;
        let i_min = (center + 1).saturating_sub(num_taps).div_ceil(up);
        let i_max = (center / up).min(signal.len().saturating_sub(1));
        let mut acc = 0.0f32;
        for (i, &x) in signal
            .iter()
            .enumerate()
            .take(i_max + 1)
            .skip(i_min)
        {
            acc += taps[center - i * up] * x;
        }
        // The zero-stuffed stream carries 1/up of the energy per sample.
        out.push(acc * up as f32);
    }
    out
}

/// Convert a signal from `from_rate` to `to_rate` Hz.
#[must_use]
pub fn resample_to(signal: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate {
        return signal.to_vec();
    }
    resample(signal, to_rate as usize, from_rate as usize)
}
