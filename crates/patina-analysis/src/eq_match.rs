//! Tonal matching: banded EQ curve from two log-magnitude spectra.
//!
//! Computes the dB difference between a reference and a source spectrum
//! on a common linear frequency grid and compresses it into a fixed
//! number of contiguous bands. The per-band statistic is the **median**
//! of the grid differences; a narrow resonance in either recording
//! should not drag a whole band's gain with it.

use crate::fft::{Fft, Window, magnitudes};

/// Number of output bands.
pub const EQ_BAND_COUNT: usize = 8;

/// Comparison grid resolution.
const GRID_POINTS: usize = 512;

/// Analysis FFT size.
const EQ_FFT_SIZE: usize = 4096;

/// Lowest matched frequency in Hz.
const LO_FREQ: f32 = 20.0;

/// One band of the matching curve.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EqBand {
    /// Band lower edge, Hz.
    pub lo_hz: f32,
    /// Band upper edge, Hz.
    pub hi_hz: f32,
    /// Gain to apply to the source to approach the reference, dB.
    pub gain_db: f32,
}

/// Log-magnitude spectrum (dB) of the head of a signal, with bin
/// frequencies.
fn log_mag_spectrum(samples: &[f32], sample_rate: f32) -> (Vec<f32>, Vec<f32>) {
    let fft = Fft::new(EQ_FFT_SIZE);
    let mut frame = vec![0.0f32; EQ_FFT_SIZE];
    let head = samples.len().min(EQ_FFT_SIZE);
    frame[..head].copy_from_slice(&samples[..head]);
    Window::Hann.apply(&mut frame);

    let mut mag = magnitudes(&fft.forward(&frame));
    mag.truncate(EQ_FFT_SIZE / 2);
    let db: Vec<f32> = mag.iter().map(|&m| 20.0 * m.log10()).collect();

    let bin_width = sample_rate / EQ_FFT_SIZE as f32;
    let freqs: Vec<f32> = (0..db.len()).map(|i| i as f32 * bin_width).collect();
    (freqs, db)
}

/// Linear interpolation of `(freqs, values)` onto `grid`, clamped at the
/// ends.
fn interp_onto(freqs: &[f32], values: &[f32], grid: &[f32]) -> Vec<f32> {
    let mut out = Vec::with_capacity(grid.len());
    for &g in grid {
        if g <= freqs[0] {
            out.push(values[0]);
        } else if g >= freqs[freqs.len() - 1] {
            out.push(values[values.len() - 1]);
        } else {
            // freqs are monotonically increasing, so the partition point
            // is the first bin at or above g.
            let i1 = freqs.partition_point(|&f| f < g);
            let i0 = i1 - 1;
            let t = (g - freqs[i0]) / (freqs[i1] - freqs[i0]).max(1e-6);
            out.push(values[i0] * (1.0 - t) + values[i1] * t);
        }
    }
    out
}

/// Median of a slice (by value; the slice is copied and sorted).
fn median(values: &[f32]) -> f32 {
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(f32::total_cmp);
    sorted[sorted.len() / 2]
}

/// Compute the banded EQ curve that moves `source` toward `reference`.
///
/// Always returns exactly [`EQ_BAND_COUNT`] contiguous, non-overlapping
/// bands with monotonically increasing edges spanning
/// `[20 Hz, min(Nyquist_source, Nyquist_reference))`.
#[must_use]
pub fn eq_match(
    source: &[f32],
    source_rate: f32,
    reference: &[f32],
    reference_rate: f32,
) -> Vec<EqBand> {
    let (src_freqs, src_db) = log_mag_spectrum(source, source_rate);
    let (ref_freqs, ref_db) = log_mag_spectrum(reference, reference_rate);

    let max_freq = src_freqs[src_freqs.len() - 1].min(ref_freqs[ref_freqs.len() - 1]);
    let grid: Vec<f32> = (0..GRID_POINTS)
        .map(|i| LO_FREQ + (max_freq - LO_FREQ) * i as f32 / GRID_POINTS as f32)
        .collect();

    let src_grid = interp_onto(&src_freqs, &src_db, &grid);
    let ref_grid = interp_onto(&ref_freqs, &ref_db, &grid);
    // dB boost needed on the source to match the reference.
    let diff: Vec<f32> = ref_grid
        .iter()
        .zip(src_grid.iter())
        .map(|(&r, &s)| r - s)
        .collect();

    let edges: Vec<usize> = (0..=EQ_BAND_COUNT)
        .map(|i| i * (GRID_POINTS - 1) / EQ_BAND_COUNT)
        .collect();

    let mut bands = Vec::with_capacity(EQ_BAND_COUNT);
    for band in 0..EQ_BAND_COUNT {
        let i0 = edges[band];
        let i1 = edges[band + 1];
        bands.push(EqBand {
            lo_hz: grid[i0],
            hi_hz: grid[i1],
            gain_db: median(&diff[i0..=i1]),
        });
    }
    bands
}
