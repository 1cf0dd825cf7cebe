//! Windowed-sinc FIR design (Kaiser window).
//!
//! Coefficients are computed analytically at construction time in `f64`
//! and stored as `f32`:
//!
//! ```text
//! h[n] = sinc(2·cutoff·n) · I0(β·√(1 − (n/M)²)) / I0(β)
//! ```
//!
//! normalized so the tap sum (DC gain) is exactly 1. `I0` is the zeroth
//! order modified Bessel function, evaluated by its power series.
//!
//! Reference: A. V. Oppenheim and R. W. Schafer, *Discrete-Time Signal
//! Processing*, 3rd ed., Section 7.6 (window method with Kaiser windows).

extern crate alloc;
use alloc::vec::Vec;

/// Zeroth-order modified Bessel function of the first kind.
///
/// Power series, truncated once terms fall below 1e-12 (at most 20 terms
/// for the β values used here).
fn bessel_i0(x: f64) -> f64 {
    let y = x / 2.0;
    let mut sum = 1.0;
    let mut term = 1.0;
    for k in 1..=20 {
        term *= (y * y) / ((k * k) as f64);
        sum += term;
        if term < 1e-12 {
            break;
        }
    }
    sum
}

/// Design a Kaiser-windowed sinc lowpass.
///
/// # Arguments
/// * `length` - Tap count; must be odd (symmetric Type I filter)
/// * `cutoff` - Normalized cutoff in cycles/sample, range (0, 0.5)
/// * `beta` - Kaiser shape parameter (8.6 gives roughly 90 dB stopband)
///
/// # Panics
/// Debug-asserts an odd `length`.
#[must_use]
pub fn kaiser_lowpass(length: usize, cutoff: f32, beta: f32) -> Vec<f32> {
    debug_assert!(length % 2 == 1, "kaiser_lowpass wants an odd length");
    let m = ((length - 1) / 2) as f64;
    let cutoff = f64::from(cutoff);
    let beta = f64::from(beta);
    let i0_beta = bessel_i0(beta);

    let mut taps: Vec<f64> = Vec::with_capacity(length);
    for i in 0..length {
        let n = i as f64 - m;
        let sinc = if n == 0.0 {
            2.0 * cutoff
        } else {
            libm::sin(2.0 * core::f64::consts::PI * cutoff * n) / (core::f64::consts::PI * n)
        };
        let r = n / m;
        let window = bessel_i0(beta * libm::sqrt((1.0 - r * r).max(0.0))) / i0_beta;
        taps.push(sinc * window);
    }

    let sum: f64 = taps.iter().sum();
    taps.iter().map(|&t| (t / sum) as f32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unity_dc_gain() {
        let taps = kaiser_lowpass(31, 0.118, 8.6);
        let sum: f32 = taps.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6, "tap sum {sum}");
    }

    #[test]
    fn test_symmetric() {
        let taps = kaiser_lowpass(129, 0.059, 8.6);
        for i in 0..taps.len() / 2 {
            assert!(
                (taps[i] - taps[taps.len() - 1 - i]).abs() < 1e-9,
                "asymmetry at tap {i}"
            );
        }
    }

    #[test]
    fn test_bessel_known_values() {
        // I0(0) = 1, I0(1) ≈ 1.2661, I0(2) ≈ 2.2796
        assert!((bessel_i0(0.0) - 1.0).abs() < 1e-12);
        assert!((bessel_i0(1.0) - 1.26607).abs() < 1e-4);
        assert!((bessel_i0(2.0) - 2.27959).abs() < 1e-4);
    }

    #[test]
    fn test_stopband_rejection() {
        // Evaluate |H| at twice the cutoff; should be far down.
        let cutoff = 0.118f32;
        let taps = kaiser_lowpass(31, cutoff, 8.6);
        let omega = 2.0 * core::f32::consts::PI * (2.0 * cutoff);
        let mut re = 0.0f32;
        let mut im = 0.0f32;
        for (n, &t) in taps.iter().enumerate() {
            re += t * libm::cosf(omega * n as f32);
            im -= t * libm::sinf(omega * n as f32);
        }
        let mag = libm::sqrtf(re * re + im * im);
        assert!(mag < 0.01, "stopband leakage {mag}");
    }
}
