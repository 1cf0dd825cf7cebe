//! Windowed-FFT spectral and level metering for the live pipeline.
//!
//! The analyzer owns a fixed 1024-sample analysis window taken from the
//! tail of each output block, a pre-planned FFT, and all scratch it
//! needs, so `analyze` performs no allocation and is safe to call from
//! the audio thread. Display code receives read-only [`SpectralFrame`]
//! snapshots by value.

use rustfft::num_complex::Complex;
use rustfft::{Fft as RustFft, FftPlanner};
use std::sync::Arc;

use crate::dynamics;
use crate::fft::Window;

/// Analysis window length in samples.
pub const METER_FFT_SIZE: usize = 1024;

/// Published spectrum length (positive frequencies below Nyquist).
pub const SPECTRUM_BINS: usize = METER_FFT_SIZE / 2;

/// dB floor of the normalized display range.
const MIN_DB: f32 = -90.0;
/// dB ceiling of the normalized display range.
const MAX_DB: f32 = -5.0;

/// History retained per update; the remainder blends in the new frame.
const SMOOTH: f32 = 0.6;

/// Peak max-hold decay per update when not exceeded.
const PEAK_DECAY: f32 = 0.98;

/// One published metering snapshot.
#[derive(Debug, Clone)]
pub struct SpectralFrame {
    /// Smoothed magnitude spectrum normalized to [0, 1]
    /// (`SPECTRUM_BINS` entries).
    pub spectrum: Vec<f32>,
    /// Smoothed RMS level, [0, 1].
    pub rms: f32,
    /// Max-hold peak level with slow decay.
    pub peak: f32,
}

impl Default for SpectralFrame {
    fn default() -> Self {
        Self {
            spectrum: vec![0.0; SPECTRUM_BINS],
            rms: 0.0,
            peak: 0.0,
        }
    }
}

/// Windowed-FFT spectral/level estimator.
pub struct MeteringAnalyzer {
    fft: Arc<dyn RustFft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    fft_scratch: Vec<Complex<f32>>,
    normalized: Vec<f32>,
    frame: SpectralFrame,
}

impl Default for MeteringAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl MeteringAnalyzer {
    /// Create an analyzer with all scratch pre-sized.
    #[must_use]
    pub fn new() -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(METER_FFT_SIZE);
        let scratch_len = fft.get_inplace_scratch_len();
        Self {
            fft,
            window: Window::Hann.coefficients(METER_FFT_SIZE),
            buffer: vec![Complex::new(0.0, 0.0); METER_FFT_SIZE],
            fft_scratch: vec![Complex::new(0.0, 0.0); scratch_len],
            normalized: vec![0.0; SPECTRUM_BINS],
            frame: SpectralFrame::default(),
        }
    }

    /// Analyze the tail of an output block.
    ///
    /// Blocks shorter than the analysis window leave the frame
    /// unchanged; the next full-size block will refresh it.
    pub fn analyze(&mut self, samples: &[f32]) {
        if samples.len() < METER_FFT_SIZE {
            return;
        }
        let tail = &samples[samples.len() - METER_FFT_SIZE..];

        let rms = dynamics::rms(tail);
        let peak = dynamics::peak(tail);

        for (i, (&x, &w)) in tail.iter().zip(self.window.iter()).enumerate() {
            self.buffer[i] = Complex::new(x * w, 0.0);
        }
        self.fft
            .process_with_scratch(&mut self.buffer, &mut self.fft_scratch);

        let range = MAX_DB - MIN_DB;
        for (bin, value) in self.normalized.iter_mut().enumerate() {
            let mag_sq = self.buffer[bin].norm_sqr().max(1e-12);
            let db = 10.0 * mag_sq.log10();
            *value = ((db - MIN_DB) / range).clamp(0.0, 1.0);
        }

        for (smoothed, &new) in self.frame.spectrum.iter_mut().zip(self.normalized.iter()) {
            *smoothed = SMOOTH * *smoothed + (1.0 - SMOOTH) * new;
        }
        self.frame.rms = SMOOTH * self.frame.rms + (1.0 - SMOOTH) * (rms * 3.0).min(1.0);
        if peak > self.frame.peak {
            self.frame.peak = peak;
        } else {
            self.frame.peak *= PEAK_DECAY;
        }
    }

    /// Borrow the current frame (audio-thread side).
    #[must_use]
    pub fn frame(&self) -> &SpectralFrame {
        &self.frame
    }

    /// Copy out the current frame for display.
    #[must_use]
    pub fn snapshot(&self) -> SpectralFrame {
        self.frame.clone()
    }

    /// Clear all metering state.
    pub fn reset(&mut self) {
        self.frame = SpectralFrame::default();
    }
}
