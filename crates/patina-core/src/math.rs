//! Mathematical utility functions for DSP.
//!
//! Level conversions, mixing helpers, and the guarded transcendentals the
//! waveshaping stage builds on. All functions are allocation-free and
//! suitable for `no_std`.

use libm::{coshf, expf, logf};

/// Convert decibels to linear gain.
///
/// # Example
/// ```rust
/// use patina_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 0.001);
/// assert!((db_to_linear(-6.02) - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    // 10^(dB/20) = e^(dB * ln(10)/20)
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Convert linear gain to decibels.
///
/// The input is floored at 1e-10 so silence maps to a large negative
/// number instead of -inf.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    logf(linear.max(1e-10)) * FACTOR
}

/// Natural log of the hyperbolic cosine, `ln(cosh(x))`.
///
/// The antiderivative of `tanh`. For |x| above ~20, `cosh(x)` overflows
/// `f32`, so the asymptotic form `|x| - ln 2` is used instead (the two
/// agree to within f32 precision well before the switch point).
#[inline]
pub fn ln_cosh(x: f32) -> f32 {
    let ax = x.abs();
    if ax > 20.0 {
        ax - core::f32::consts::LN_2
    } else {
        logf(coshf(ax))
    }
}

/// Linear interpolation between two values.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Crossfade between dry and wet signals.
///
/// Equivalent to `dry * (1 - mix) + wet * mix` but uses one fewer multiply:
/// `dry + (wet - dry) * mix`.
#[inline]
pub fn wet_dry_mix(dry: f32, wet: f32, mix: f32) -> f32 {
    dry + (wet - dry) * mix
}

/// Sum stereo to mono (average of the channels).
#[inline]
pub fn mono_sum(left: f32, right: f32) -> f32 {
    (left + right) * 0.5
}

/// Flush subnormal (denormalized) floats to zero.
///
/// Subnormal floats cause severe CPU performance degradation on most
/// architectures. Values below 1e-20 are replaced with zero, which gives
/// margin before the IEEE 754 subnormal range begins. Use in feedback
/// state (DC accumulators, one-pole filters) where signal can decay
/// indefinitely toward zero.
#[allow(clippy::inline_always)]
#[inline(always)]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}
