//! Harmonic/percussive separation via median-filtered spectrograms.
//!
//! Classic median-filtering HPSS: sustained (harmonic) content forms
//! horizontal ridges in a spectrogram, transient (percussive) content
//! forms vertical ones. Median-filtering each bin across time estimates
//! the harmonic magnitude, median-filtering each frame across frequency
//! estimates the percussive magnitude, and soft masks split the original
//! spectrogram between the two.
//!
//! Reconstruction uses inverse STFT with overlap-add and **zero phase**.
//! That is a deliberate simplification: the outputs feed the feature
//! extractor, which only looks at magnitudes and envelope statistics.
//! They are not audible-quality stems and must never be played back.
//!
//! Reference: D. FitzGerald, "Harmonic/Percussive Separation Using Median
//! Filtering", DAFx-2010.

use rustfft::num_complex::Complex;

use crate::fft::{Fft, Window, magnitudes};

/// STFT frame length.
pub const HPSS_FFT_SIZE: usize = 2048;

/// STFT hop.
pub const HPSS_HOP: usize = 512;

/// Median window span, in frames (time axis) and bins (frequency axis).
const MEDIAN_SPAN: usize = 17;

/// Result of one separation pass.
#[derive(Debug, Clone)]
pub struct HpssSeparation {
    /// Zero-phase reconstruction of the harmonic layer.
    pub harmonic: Vec<f32>,
    /// Zero-phase reconstruction of the percussive layer.
    pub percussive: Vec<f32>,
}

/// Median filter with an edge-clamped window.
///
/// Each output is the median of the samples in a `span`-wide window
/// centered on the input, shortened at the edges.
fn median_filter(input: &[f32], span: usize) -> Vec<f32> {
    let n = input.len();
    let half = span / 2;
    let mut window = Vec::with_capacity(span);
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let start = i.saturating_sub(half);
        let end = (i + half).min(n - 1);
        window.clear();
        window.extend_from_slice(&input[start..=end]);
        window.sort_unstable_by(f32::total_cmp);
        out.push(window[window.len() / 2]);
    }
    out
}

/// Separate a mono signal into harmonic and percussive layers.
///
/// Signals shorter than one STFT frame are zero-padded into a single
/// frame. Never produces NaN: magnitudes carry a small floor and the
/// mask denominator is epsilon-guarded.
#[must_use]
pub fn separate(samples: &[f32]) -> HpssSeparation {
    let fft = Fft::new(HPSS_FFT_SIZE);
    let window = Window::Hann.coefficients(HPSS_FFT_SIZE);
    let bins = HPSS_FFT_SIZE / 2 + 1;

    let num_frames = if samples.len() >= HPSS_FFT_SIZE {
        (samples.len() - HPSS_FFT_SIZE) / HPSS_HOP + 1
    } else {
        1
    };

    // Magnitude spectrogram, [bin][frame].
    let mut mag = vec![vec![0.0f32; num_frames]; bins];
    for frame in 0..num_frames {
        let start = frame * HPSS_HOP;
        let mut buf = vec![0.0f32; HPSS_FFT_SIZE];
        let available = samples.len().saturating_sub(start).min(HPSS_FFT_SIZE);
        buf[..available].copy_from_slice(&samples[start..start + available]);
        for (x, &w) in buf.iter_mut().zip(window.iter()) {
            *x *= w;
        }
        let spectrum = fft.forward(&buf);
        for (bin, &m) in magnitudes(&spectrum).iter().enumerate() {
            mag[bin][frame] = m;
        }
    }

    // Harmonic likelihood: median across time per bin.
    let harmonic_mag: Vec<Vec<f32>> = mag
        .iter()
        .map(|row| median_filter(row, MEDIAN_SPAN))
        .collect();

    // Percussive likelihood: median across frequency per frame.
    let mut percussive_mag = vec![vec![0.0f32; num_frames]; bins];
    let mut column = vec![0.0f32; bins];
    for frame in 0..num_frames {
        for bin in 0..bins {
            column[bin] = mag[bin][frame];
        }
        let filtered = median_filter(&column, MEDIAN_SPAN);
        for bin in 0..bins {
            percussive_mag[bin][frame] = filtered[bin];
        }
    }

    // Soft masks applied to the original magnitudes.
    let mut masked_h = vec![vec![0.0f32; num_frames]; bins];
    let mut masked_p = vec![vec![0.0f32; num_frames]; bins];
    for bin in 0..bins {
        for frame in 0..num_frames {
            let h = harmonic_mag[bin][frame];
            let p = percussive_mag[bin][frame];
            let denom = h + p + 1e-9;
            masked_h[bin][frame] = mag[bin][frame] * (h / denom);
            masked_p[bin][frame] = mag[bin][frame] * (p / denom);
        }
    }

    HpssSeparation {
        harmonic: istft_zero_phase(&fft, &masked_h, num_frames),
        percussive: istft_zero_phase(&fft, &masked_p, num_frames),
    }
}

/// Overlap-add inverse STFT discarding all phase.
///
/// Each frame's spectrum is treated as purely real (zero phase), mirrored
/// into conjugate symmetry, inverted, and accumulated. Valid only for
/// downstream magnitude-domain feature extraction.
fn istft_zero_phase(fft: &Fft, masked: &[Vec<f32>], num_frames: usize) -> Vec<f32> {
    let bins = masked.len();
    let mut output = vec![0.0f32; num_frames * HPSS_HOP + HPSS_FFT_SIZE];
    let mut buf = vec![Complex::new(0.0f32, 0.0); HPSS_FFT_SIZE];

    for frame in 0..num_frames {
        for (bin, row) in masked.iter().enumerate() {
            buf[bin] = Complex::new(row[frame], 0.0);
        }
        // Conjugate-symmetric mirror; with zero phase that is a plain copy.
        for bin in 1..HPSS_FFT_SIZE - bins + 1 {
            let src = bins - 1 - bin;
            if src > 0 && src < bins {
                buf[bins - 1 + bin] = Complex::new(masked[src][frame], 0.0);
            }
        }
        fft.inverse_complex(&mut buf);

        let start = frame * HPSS_HOP;
        for (i, c) in buf.iter().enumerate() {
            output[start + i] += c.re;
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn tone_with_clicks(len: usize) -> Vec<f32> {
        let mut signal: Vec<f32> = (0..len)
            .map(|i| 0.5 * (2.0 * PI * 440.0 * i as f32 / 48000.0).sin())
            .collect();
        // Broadband clicks every 4096 samples.
        for click in (2048..len).step_by(4096) {
            for i in 0..32 {
                if click + i < len {
                    signal[click + i] += if i % 2 == 0 { 0.9 } else { -0.9 };
                }
            }
        }
        signal
    }

    #[test]
    fn test_median_filter_basic() {
        let data = [1.0, 9.0, 1.0, 1.0, 1.0];
        let filtered = median_filter(&data, 3);
        // The spike is removed from the interior.
        assert_eq!(filtered[1], 1.0);
        assert_eq!(filtered[2], 1.0);
    }

    #[test]
    fn test_median_filter_edges_clamp() {
        let data = [5.0, 1.0, 1.0, 1.0, 5.0];
        let filtered = median_filter(&data, 5);
        assert_eq!(filtered.len(), data.len());
        for v in filtered {
            assert!(v.is_finite());
        }
    }

    #[test]
    fn test_separation_outputs_finite_and_sized() {
        let signal = tone_with_clicks(16384);
        let result = separate(&signal);
        assert!(!result.harmonic.is_empty());
        assert_eq!(result.harmonic.len(), result.percussive.len());
        assert!(result.harmonic.iter().all(|x| x.is_finite()));
        assert!(result.percussive.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_steady_tone_lands_in_harmonic_layer() {
        // A pure sustained tone should carry far more energy in the
        // harmonic reconstruction than in the percussive one.
        let signal: Vec<f32> = (0..16384)
            .map(|i| 0.5 * (2.0 * PI * 440.0 * i as f32 / 48000.0).sin())
            .collect();
        let result = separate(&signal);
        let h_energy: f32 = result.harmonic.iter().map(|x| x * x).sum();
        let p_energy: f32 = result.percussive.iter().map(|x| x * x).sum();
        assert!(
            h_energy > p_energy * 2.0,
            "harmonic {h_energy} vs percussive {p_energy}"
        );
    }

    #[test]
    fn test_short_input_does_not_panic() {
        let short = vec![0.1f32; 100];
        let result = separate(&short);
        assert!(result.harmonic.iter().all(|x| x.is_finite()));
    }
}
