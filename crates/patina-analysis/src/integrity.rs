//! Signal-integrity metrics comparing the pipeline's input and output.
//!
//! Tracks true (inter-sample) peak headroom, input/output crest factors,
//! and a transient-preservation estimate derived from spectral flux
//! against the previous metering frame. Everything is recomputed per
//! block from pre-sized state; no allocation on the audio thread.

use crate::dynamics;
use crate::metering::{SPECTRUM_BINS, SpectralFrame};

/// Per-block integrity snapshot.
#[derive(Debug, Clone, Copy)]
pub struct IntegrityMetrics {
    /// Headroom above the reconstructed inter-sample peak, dB.
    pub true_peak_headroom_db: f32,
    /// Smoothed input crest factor, dB.
    pub crest_in_db: f32,
    /// Smoothed output crest factor, dB.
    pub crest_out_db: f32,
    /// 1.0 = transients fully preserved, 0.0 = heavily smeared.
    pub transient_percent: f32,
    /// Reserved alias-risk estimate; always 0 until a stronger estimator
    /// is substituted.
    pub alias_risk: f32,
}

impl Default for IntegrityMetrics {
    fn default() -> Self {
        Self {
            true_peak_headroom_db: 0.0,
            crest_in_db: 0.0,
            crest_out_db: 0.0,
            transient_percent: 1.0,
            alias_risk: 0.0,
        }
    }
}

impl IntegrityMetrics {
    /// Crest-factor change through the pipeline, dB.
    #[must_use]
    pub fn crest_delta_db(&self) -> f32 {
        self.crest_out_db - self.crest_in_db
    }
}

/// Smoothing constant for the output-side statistics.
const OUT_SMOOTH: f32 = 0.2;

/// Flux-to-transient-loss scale.
const FLUX_SCALE: f32 = 0.002;

/// Rolling pre/post signal-integrity estimator.
pub struct IntegrityMonitor {
    last_spectrum: Vec<f32>,
    have_last: bool,
    rms_in: f32,
    peak_in: f32,
    rms_out: f32,
    peak_out: f32,
}

impl Default for IntegrityMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl IntegrityMonitor {
    /// Create a monitor with zeroed statistics.
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_spectrum: vec![0.0; SPECTRUM_BINS],
            have_last: false,
            rms_in: 0.0,
            peak_in: 0.0,
            rms_out: 0.0,
            peak_out: 0.0,
        }
    }

    /// Fold in one processed block and return the current metrics.
    ///
    /// `in_rms`/`in_peak` describe the block *before* processing;
    /// `left`/`right` are the processed output; `meter` is the metering
    /// frame computed from that same output.
    pub fn update(
        &mut self,
        in_rms: f32,
        in_peak: f32,
        left: &[f32],
        right: &[f32],
        meter: &SpectralFrame,
    ) -> IntegrityMetrics {
        // Input side: symmetric RMS smoothing, fast-attack/slow-release peak.
        self.rms_in = 0.9 * self.rms_in + 0.1 * in_rms;
        self.peak_in = (self.peak_in * 0.98).max(in_peak * 0.95);

        let out_rms = dynamics::rms(left).max(dynamics::rms(right));
        let out_peak = dynamics::peak(left).max(dynamics::peak(right));
        self.rms_out = OUT_SMOOTH * out_rms + (1.0 - OUT_SMOOTH) * self.rms_out;
        self.peak_out = (OUT_SMOOTH * out_peak + (1.0 - OUT_SMOOTH) * self.peak_out)
            .max(self.peak_out * 0.98);

        let tp = true_peak(left).max(true_peak(right));
        let headroom = -20.0 * tp.max(1e-9).log10();

        let mut transient = 1.0;
        if self.have_last && self.last_spectrum.len() == meter.spectrum.len() {
            let flux: f32 = meter
                .spectrum
                .iter()
                .zip(self.last_spectrum.iter())
                .map(|(&cur, &last)| (cur - last).max(0.0))
                .sum();
            transient = (1.0 - flux * FLUX_SCALE).clamp(0.0, 1.0);
        }
        self.last_spectrum.copy_from_slice(&meter.spectrum);
        self.have_last = true;

        IntegrityMetrics {
            true_peak_headroom_db: headroom,
            crest_in_db: dynamics::crest_db(self.peak_in, self.rms_in),
            crest_out_db: dynamics::crest_db(self.peak_out, self.rms_out),
            transient_percent: transient,
            alias_risk: 0.0,
        }
    }

    /// Clear all rolling statistics.
    pub fn reset(&mut self) {
        self.last_spectrum.fill(0.0);
        self.have_last = false;
        self.rms_in = 0.0;
        self.peak_in = 0.0;
        self.rms_out = 0.0;
        self.peak_out = 0.0;
    }
}

/// Inter-sample peak estimate.
///
/// Catmull-Rom cubic through each 4-sample neighborhood, evaluated at the
/// quarter-sample offsets t = 0.25, 0.5, 0.75. Catches peaks the sample
/// grid misses; blocks too short for the cubic fall back to sample peak.
#[must_use]
pub fn true_peak(samples: &[f32]) -> f32 {
    let n = samples.len();
    if n < 4 {
        return dynamics::peak(samples);
    }
    let mut tp = 0.0f32;
    for i in 1..n - 2 {
        let xm1 = samples[i - 1];
        let x0 = samples[i];
        let x1 = samples[i + 1];
        let x2 = samples[i + 2];
        let c0 = x0;
        let c1 = 0.5 * (x1 - xm1);
        let c2 = xm1 - 2.5 * x0 + 2.0 * x1 - 0.5 * x2;
        let c3 = 0.5 * (x2 - xm1) + 1.5 * (x0 - x1);
        for t in [0.25f32, 0.5, 0.75] {
            let y = ((t * t * t) * c3 + (t * t) * c2 + t * c1 + c0).abs();
            tp = tp.max(y);
        }
    }
    tp
}
