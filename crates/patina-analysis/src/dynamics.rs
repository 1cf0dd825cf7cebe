//! Level and dynamics measurements.

/// RMS level of a signal, linear scale.
pub fn rms(signal: &[f32]) -> f32 {
    if signal.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = signal.iter().map(|&x| x * x).sum();
    (sum_sq / signal.len() as f32).sqrt()
}

/// Peak level (maximum absolute value).
pub fn peak(signal: &[f32]) -> f32 {
    signal.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
}

/// Crest factor (peak-to-RMS ratio) in dB.
///
/// Returns 0 (not NaN or infinity) for silence, so downstream
/// smoothing never has to screen the value.
///
/// Typical values: a sine is ~3 dB, uncompressed music 12–18 dB.
pub fn crest_factor_db(signal: &[f32]) -> f32 {
    crest_db(peak(signal), rms(signal))
}

/// Crest factor from precomputed peak and RMS, in dB.
pub fn crest_db(peak: f32, rms: f32) -> f32 {
    if rms <= 1e-9 {
        return 0.0;
    }
    20.0 * (peak.max(1e-9) / rms).log10()
}

/// Zero-crossing rate: sign changes per sample.
pub fn zero_crossing_rate(signal: &[f32]) -> f32 {
    if signal.len() < 2 {
        return 0.0;
    }
    let mut crossings = 0u32;
    for pair in signal.windows(2) {
        if (pair[0] <= 0.0 && pair[1] > 0.0) || (pair[0] >= 0.0 && pair[1] < 0.0) {
            crossings += 1;
        }
    }
    crossings as f32 / signal.len() as f32
}
