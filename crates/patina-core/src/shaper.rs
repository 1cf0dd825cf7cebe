//! Analog-style waveshaping with antiderivative anti-aliasing (ADAA).
//!
//! A memoryless waveshaper `y = f(x)` creates harmonics above Nyquist that
//! fold back as aliasing. First-order ADAA suppresses them by evaluating
//! the finite difference of the antiderivative instead of the function
//! itself:
//!
//! ```text
//! y[n] = (F(x[n]) − F(x[n−1])) / (x[n] − x[n−1])
//! ```
//!
//! which is the exact average of `f` over the inter-sample interval: a
//! continuous-time box filter applied to the shaper output. When the
//! difference is below epsilon the quotient degenerates and the direct
//! evaluation `f(x[n])` is used (the L'Hôpital limit at the removable
//! singularity).
//!
//! [`AnalogShaper`] wraps the ADAA kernel with the rest of the per-channel
//! saturation stage: drive scaling with gain compensation, four selectable
//! curve families, a DC blocker, a character tone tilt, and the presence /
//! warmth enhancement passes. It runs at whatever rate the caller feeds
//! it, normally the oversampled rate between an interpolator's `up` and
//! `down` stages.
//!
//! Reference: Parker et al., "Reducing the Aliasing of Nonlinear
//! Waveshaping Using Continuous-Time Convolution", DAFx-2016.

use libm::{atanf, tanhf};

use crate::math::{flush_denormal, ln_cosh};
use crate::params::{CurveFamily, ProcessorParams};

/// Minimum input difference for the finite-difference quotient.
///
/// Below this the ADAA formula suffers catastrophic cancellation and the
/// stage falls back to direct evaluation of the waveshaper.
const ADAA_EPSILON: f32 = 1e-6;

/// DC accumulator leak coefficient. The accumulator tracks the stage
/// output, which makes this a gentle low-frequency shelf (-6 dB at DC)
/// rather than a brick-wall blocker; enough to keep asymmetric curves
/// from walking the operating point away.
const DC_ALPHA: f32 = 0.995;

/// Warmth lowpass coefficient (one-pole, fixed).
const WARMTH_ALPHA: f32 = 0.2;

/// Hard ceiling on the stage output magnitude.
const OUTPUT_BOUND: f32 = 1.2;

/// Evaluate the selected curve family at `x`.
///
/// Returns `(f(x), F(x))`, the shaper value and its antiderivative,
/// in one call so shared subexpressions are computed once.
///
/// The `Vintage` antiderivative is an analytic approximation of the true
/// primitive of `atan(x + sign(x)·a·x²)`, not an exact integral. It is
/// kept as-is deliberately; replacing it changes the voicing.
#[must_use]
pub fn curve_eval(curve: CurveFamily, saturation: f32, x: f32) -> (f32, f32) {
    match curve {
        CurveFamily::Soft => (tanhf(x), ln_cosh(x)),
        CurveFamily::Warm => {
            let s = 1.0 + saturation * 4.0;
            if x > 0.0 {
                // Positive half: softened by 1/s
                (tanhf(x * s) / s, ln_cosh(x * s) / (s * s))
            } else {
                // Negative half: hardened by the asymmetry factor
                let c = 1.2 + saturation * 0.8;
                let sc = s * c;
                (tanhf(x * sc) / sc, ln_cosh(x * sc) / (sc * sc))
            }
        }
        CurveFamily::Tape => {
            // F(x) = |x| − ln(1+|x|), the exact (even) primitive of the
            // odd transfer function.
            let ax = x.abs();
            let f = x / (1.0 + ax);
            let ad = ax - libm::logf(1.0 + ax);
            (f, ad)
        }
        CurveFamily::Vintage => {
            let a = 0.2 + saturation * 0.3;
            let f = atanf(x + x.signum() * a * x * x) / core::f32::consts::FRAC_PI_2;
            let ad = libm::logf(1.0 + x * x) * 0.5 + a * x * x * x / 3.0;
            (f, ad)
        }
    }
}

/// First-order ADAA state: previous input and its antiderivative.
#[derive(Debug, Clone, Copy, Default)]
struct AdaaState {
    prev_x: f32,
    prev_ad: f32,
}

impl AdaaState {
    /// Advance by one sample given the current `(f, F)` evaluation.
    #[inline]
    fn advance(&mut self, x: f32, f_val: f32, ad: f32) -> f32 {
        let dx = x - self.prev_x;
        let y = if dx.abs() > ADAA_EPSILON {
            (ad - self.prev_ad) / dx
        } else {
            f_val
        };
        self.prev_x = x;
        self.prev_ad = ad;
        y
    }

    fn reset(&mut self, curve: CurveFamily, saturation: f32) {
        let (_, ad) = curve_eval(curve, saturation, 0.0);
        self.prev_x = 0.0;
        self.prev_ad = ad;
    }
}

/// Per-channel analog saturation stage.
///
/// Owns all of its state exclusively; stereo processing uses two
/// instances. Reconfiguring to a different curve family resets the state
/// so the first samples of the new curve never difference against stale
/// antiderivative values.
///
/// # Example
///
/// ```rust
/// use patina_core::shaper::AnalogShaper;
/// use patina_core::ProcessorParams;
///
/// let mut shaper = AnalogShaper::new();
/// shaper.configure(&ProcessorParams::default());
///
/// let mut block = [0.0, 0.1, 0.3, 0.5, 0.3, 0.1];
/// shaper.process_block(&mut block);
/// assert!(block.iter().all(|y| y.is_finite()));
/// ```
pub struct AnalogShaper {
    curve: CurveFamily,
    drive_gain: f32,
    character: f32,
    saturation: f32,
    presence: f32,
    warmth: f32,
    adaa: AdaaState,
    /// DC blocker accumulator.
    dc_state: f32,
    /// Previous post-shaping sample for the presence first difference.
    presence_prev: f32,
    /// Warmth one-pole lowpass state.
    warmth_state: f32,
}

impl Default for AnalogShaper {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalogShaper {
    /// Create a shaper with default parameters and zero state.
    #[must_use]
    pub fn new() -> Self {
        let params = ProcessorParams::default();
        let mut shaper = Self {
            curve: params.curve,
            drive_gain: params.drive_gain(),
            character: params.character,
            saturation: params.saturation,
            presence: params.presence,
            warmth: params.warmth,
            adaa: AdaaState::default(),
            dc_state: 0.0,
            presence_prev: 0.0,
            warmth_state: 0.0,
        };
        shaper.reset();
        shaper
    }

    /// Apply a parameter snapshot.
    ///
    /// Switching curve families resets the internal state; everything else
    /// takes effect without disturbing it.
    pub fn configure(&mut self, params: &ProcessorParams) {
        let curve_changed = params.curve != self.curve;
        self.curve = params.curve;
        self.drive_gain = params.drive_gain();
        self.character = params.character;
        self.saturation = params.saturation;
        self.presence = params.presence;
        self.warmth = params.warmth;
        if curve_changed {
            self.reset();
        }
    }

    /// Clear all state.
    pub fn reset(&mut self) {
        self.adaa.reset(self.curve, self.saturation);
        self.dc_state = 0.0;
        self.presence_prev = 0.0;
        self.warmth_state = 0.0;
    }

    /// Shape a single sample (ADAA, DC blocking, tone tilt).
    ///
    /// The presence and warmth passes are block-level; see
    /// [`process_block`](Self::process_block).
    #[inline]
    pub fn process_sample(&mut self, input: f32) -> f32 {
        let x = input * self.drive_gain;
        let (f_val, ad) = curve_eval(self.curve, self.saturation, x);
        // Drive-compensated so zero drive is near-unity passthrough:
        // drive changes harmonic density, not loudness.
        let y = self.adaa.advance(x, f_val, ad) / self.drive_gain;

        let out = y - self.dc_state;
        self.dc_state = flush_denormal(DC_ALPHA * self.dc_state + (1.0 - DC_ALPHA) * out);

        if self.character > 0.5 {
            out * (1.0 + (self.character - 0.5) * 0.4)
        } else {
            out * (1.0 - (0.5 - self.character) * 0.3)
        }
    }

    /// Shape a block in place, then run the presence and warmth passes.
    pub fn process_block(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process_sample(*sample);
        }

        if self.presence > 0.01 {
            let amount = self.presence * 0.3;
            for sample in buffer.iter_mut() {
                let hf = *sample - self.presence_prev;
                self.presence_prev = *sample;
                *sample += hf * amount;
            }
        }

        if self.warmth > 0.01 {
            let amount = self.warmth * 0.4;
            for sample in buffer.iter_mut() {
                self.warmth_state = flush_denormal(
                    WARMTH_ALPHA * *sample + (1.0 - WARMTH_ALPHA) * self.warmth_state,
                );
                *sample += self.warmth_state * amount;
            }
        }

        // Output guard. The Vintage antiderivative approximation can
        // overshoot the transfer function's codomain (its error term grows
        // with drive), and the enhancement passes stack on top; the stage
        // contract is |y| <= 1.2 regardless.
        for sample in buffer.iter_mut() {
            *sample = sample.clamp(-OUTPUT_BOUND, OUTPUT_BOUND);
        }
    }
}
