//! Block FIR convolution helpers shared by the interpolators.
//!
//! Both variants treat samples outside the block as zero, so a block
//! shorter than the filter's settling length picks up minor transient
//! inaccuracy at its edges. That trade is accepted: the interpolators are
//! stateless across blocks by design.

/// Delay-compensated (centered) convolution with a symmetric FIR.
///
/// `out[i]` is the filter output aligned with `input[i]`, so a
/// linear-phase filter introduces no latency through this path.
/// `out` must be at least as long as `input`; extra tail entries are
/// untouched.
pub(crate) fn convolve_centered(input: &[f32], taps: &[f32], out: &mut [f32]) {
    let half = (taps.len() - 1) / 2;
    for (i, slot) in out.iter_mut().enumerate().take(input.len()) {
        let mut acc = 0.0f32;
        for (k, &tap) in taps.iter().enumerate() {
            let j = i + k;
            if j >= half && j - half < input.len() {
                acc += tap * input[j - half];
            }
        }
        *slot = acc;
    }
}

/// Causal convolution: `out[i] = Σ taps[k] · input[i − k]`.
///
/// A symmetric filter applied this way delays the signal by
/// `(taps.len() − 1) / 2` samples.
pub(crate) fn convolve_causal(input: &[f32], taps: &[f32], out: &mut [f32]) {
    for (i, slot) in out.iter_mut().enumerate().take(input.len()) {
        let mut acc = 0.0f32;
        for (k, &tap) in taps.iter().enumerate() {
            if i >= k {
                acc += tap * input[i - k];
            }
        }
        *slot = acc;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    extern crate alloc;
    use alloc::vec;

    #[test]
    fn test_centered_has_no_delay() {
        // Impulse through a symmetric 5-tap filter: the peak stays put.
        let taps = [0.1, 0.2, 0.4, 0.2, 0.1];
        let mut input = vec![0.0f32; 32];
        input[16] = 1.0;
        let mut out = vec![0.0f32; 32];
        convolve_centered(&input, &taps, &mut out);
        let peak = out
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.abs().partial_cmp(&b.1.abs()).unwrap())
            .unwrap()
            .0;
        assert_eq!(peak, 16);
    }

    #[test]
    fn test_causal_delays_by_half_length() {
        let taps = [0.1, 0.2, 0.4, 0.2, 0.1];
        let mut input = vec![0.0f32; 32];
        input[10] = 1.0;
        let mut out = vec![0.0f32; 32];
        convolve_causal(&input, &taps, &mut out);
        let peak = out
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.abs().partial_cmp(&b.1.abs()).unwrap())
            .unwrap()
            .0;
        assert_eq!(peak, 12);
    }

    #[test]
    fn test_dc_gain_is_tap_sum() {
        let taps = [0.25, 0.5, 0.25];
        let input = vec![1.0f32; 64];
        let mut out = vec![0.0f32; 64];
        convolve_centered(&input, &taps, &mut out);
        // Away from the edges the output equals the tap sum.
        assert!((out[32] - 1.0).abs() < 1e-6);
    }
}
