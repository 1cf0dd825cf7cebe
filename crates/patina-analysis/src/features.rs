//! Feature extraction for the reference analyzer.
//!
//! Summarizes a (harmonic-layer) signal into the handful of scalar
//! descriptors the recommendation stage maps onto processor parameters.
//! One large FFT over the head of the signal stands in for a full
//! spectrogram; the descriptors are coarse by design.

use crate::dynamics;
use crate::fft::{Fft, Window, magnitudes};

/// FFT size for the spectral descriptors.
pub const FEATURE_FFT_SIZE: usize = 4096;

/// Scalar feature set describing a source recording.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceFeatures {
    /// Crest factor in dB.
    pub crest_db: f32,
    /// RMS level, linear.
    pub rms: f32,
    /// Mean normalized magnitude, 20-200 Hz.
    pub band_low: f32,
    /// Mean normalized magnitude, 200-2000 Hz.
    pub band_mid: f32,
    /// Mean normalized magnitude, 4-12 kHz.
    pub band_high: f32,
    /// Zero-crossing rate, crossings per sample.
    pub zcr: f32,
    /// Spectral centroid in Hz.
    pub centroid_hz: f32,
    /// Spectral flatness: geometric/arithmetic mean ratio, 0 tonal .. 1
    /// noisy.
    pub flatness: f32,
    /// Mean positive bin-to-bin magnitude increase.
    pub flux: f32,
}

/// Extract the feature set from a mono signal.
///
/// All divisions are epsilon-guarded; silence produces all-zero features
/// rather than NaN.
#[must_use]
pub fn extract(samples: &[f32], sample_rate: f32) -> SourceFeatures {
    let crest_db = dynamics::crest_factor_db(samples);
    let rms = dynamics::rms(samples);
    let zcr = dynamics::zero_crossing_rate(samples);

    // Single windowed frame from the head of the signal.
    let fft = Fft::new(FEATURE_FFT_SIZE);
    let mut frame = vec![0.0f32; FEATURE_FFT_SIZE];
    let head = samples.len().min(FEATURE_FFT_SIZE);
    frame[..head].copy_from_slice(&samples[..head]);
    Window::Hann.apply(&mut frame);
    let mut mag = magnitudes(&fft.forward(&frame));
    mag.truncate(FEATURE_FFT_SIZE / 2);

    // Normalize against the strongest bin so band levels are relative.
    let max_mag = mag.iter().fold(0.0f32, |a, &b| a.max(b));
    if max_mag > 0.0 {
        for m in mag.iter_mut() {
            *m /= max_mag;
        }
    }

    let bin_width = sample_rate / FEATURE_FFT_SIZE as f32;
    let band_mean = |lo_hz: f32, hi_hz: f32| -> f32 {
        let lo = (lo_hz / bin_width) as usize;
        let hi = ((hi_hz / bin_width) as usize).min(mag.len() - 1);
        if hi <= lo {
            return 0.0;
        }
        mag[lo..=hi].iter().sum::<f32>() / (hi - lo + 1) as f32
    };
    let band_low = band_mean(20.0, 200.0);
    let band_mid = band_mean(200.0, 2000.0);
    let band_high = band_mean(4000.0, 12000.0);

    // Centroid: magnitude-weighted mean bin, converted to Hz.
    let mut weighted = 0.0f32;
    let mut total = 0.0f32;
    for (i, &m) in mag.iter().enumerate() {
        weighted += i as f32 * m;
        total += m;
    }
    let centroid_hz = weighted / (total + 1e-9) * bin_width;

    // Flatness: geometric over arithmetic mean.
    let n = mag.len() as f32;
    let log_sum: f32 = mag.iter().map(|&m| m.max(1e-9).ln()).sum();
    let geometric = (log_sum / n).exp();
    let arithmetic = total / n;
    let flatness = geometric / arithmetic.max(1e-9);

    // Flux: positive bin-to-bin increase, averaged. On a single frame
    // this is a bin-to-bin statistic rather than frame-to-frame.
    let flux = mag
        .windows(2)
        .map(|w| (w[1] - w[0]).max(0.0))
        .sum::<f32>()
        / n;

    SourceFeatures {
        crest_db,
        rms,
        band_low,
        band_mid,
        band_high,
        zcr,
        centroid_hz,
        flatness,
        flux,
    }
}
