//! FFT wrapper with windowing functions.

use rustfft::{FftPlanner, num_complex::Complex};
use std::f32::consts::PI;
use std::sync::Arc;

/// Window function types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// Rectangular (no windowing)
    Rectangular,
    /// Hann window (raised cosine)
    Hann,
    /// Blackman window
    Blackman,
}

impl Window {
    /// Apply the window to a buffer in place.
    pub fn apply(&self, buffer: &mut [f32]) {
        let n = buffer.len();
        match self {
            Window::Rectangular => {}
            Window::Hann => {
                for (i, sample) in buffer.iter_mut().enumerate() {
                    let w = 0.5 * (1.0 - (2.0 * PI * i as f32 / n as f32).cos());
                    *sample *= w;
                }
            }
            Window::Blackman => {
                for (i, sample) in buffer.iter_mut().enumerate() {
                    let x = 2.0 * PI * i as f32 / n as f32;
                    let w = 0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos();
                    *sample *= w;
                }
            }
        }
    }

    /// Window coefficients for a given size.
    pub fn coefficients(&self, size: usize) -> Vec<f32> {
        let mut coeffs = vec![1.0; size];
        self.apply(&mut coeffs);
        coeffs
    }
}

/// FFT processor with cached plans.
pub struct Fft {
    fft: Arc<dyn rustfft::Fft<f32>>,
    ifft: Arc<dyn rustfft::Fft<f32>>,
    size: usize,
}

impl Fft {
    /// Create a new FFT processor for the given size.
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let ifft = planner.plan_fft_inverse(size);
        Self { fft, ifft, size }
    }

    /// FFT size.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Forward FFT on real input.
    ///
    /// Input is zero-padded or truncated to the FFT size. Returns the
    /// positive-frequency half of the spectrum (`size/2 + 1` bins).
    pub fn forward(&self, input: &[f32]) -> Vec<Complex<f32>> {
        let mut buffer: Vec<Complex<f32>> =
            input.iter().map(|&x| Complex::new(x, 0.0)).collect();
        buffer.resize(self.size, Complex::new(0.0, 0.0));

        self.fft.process(&mut buffer);

        buffer.truncate(self.size / 2 + 1);
        buffer
    }

    /// Inverse FFT on a full-size complex buffer, in place, normalized by
    /// `1/size`.
    pub fn inverse_complex(&self, buffer: &mut [Complex<f32>]) {
        self.ifft.process(buffer);
        let scale = 1.0 / self.size as f32;
        for c in buffer.iter_mut() {
            *c *= scale;
        }
    }
}

/// Magnitude spectrum of a half spectrum, with a small floor added so
/// downstream log/division operations never see zero.
pub fn magnitudes(spectrum: &[Complex<f32>]) -> Vec<f32> {
    spectrum.iter().map(|c| c.norm() + 1e-9).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_finds_tone() {
        let size = 1024;
        let fft = Fft::new(size);
        let bin = 32;
        let input: Vec<f32> = (0..size)
            .map(|i| (2.0 * PI * bin as f32 * i as f32 / size as f32).sin())
            .collect();

        let spectrum = fft.forward(&input);
        let mags = magnitudes(&spectrum);
        let peak = mags
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .unwrap()
            .0;
        assert_eq!(peak, bin);
    }

    #[test]
    fn test_inverse_round_trip() {
        let size = 256;
        let fft = Fft::new(size);
        let input: Vec<f32> = (0..size)
            .map(|i| (2.0 * PI * 10.0 * i as f32 / size as f32).sin())
            .collect();

        let mut full: Vec<Complex<f32>> =
            input.iter().map(|&x| Complex::new(x, 0.0)).collect();
        fft.fft.process(&mut full);
        fft.inverse_complex(&mut full);

        for (a, b) in input.iter().zip(full.iter()) {
            assert!((a - b.re).abs() < 0.01, "mismatch: {} vs {}", a, b.re);
        }
    }

    #[test]
    fn test_window_hann_shape() {
        let mut buffer = vec![1.0; 100];
        Window::Hann.apply(&mut buffer);
        assert!(buffer[0] < 0.01);
        assert!(buffer[99] < 0.01);
        assert!((buffer[50] - 1.0).abs() < 0.01);
    }
}
