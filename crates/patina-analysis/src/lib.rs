//! Patina Analysis - spectral metering and offline reference analysis
//!
//! The `std` half of patina's DSP: everything that needs an FFT. Two
//! groups of functionality live here:
//!
//! **Live metering** (called from the audio thread, allocation-free after
//! construction):
//!
//! - [`MeteringAnalyzer`] - windowed-FFT spectrum/RMS/peak estimator
//!   publishing [`SpectralFrame`] snapshots
//! - [`IntegrityMonitor`] - true-peak headroom, crest factors, and
//!   transient preservation as [`IntegrityMetrics`]
//!
//! **Offline reference analysis** (worker-thread territory, allocates
//! freely):
//!
//! - [`hpss::separate`] - harmonic/percussive separation by median
//!   filtering, zero-phase reconstruction (feature extraction only)
//! - [`features::extract`] - scalar descriptors of the harmonic layer
//! - [`recommend::recommend`] - descriptor-to-parameter mapping with
//!   instrument-category overrides
//! - [`eq_match::eq_match`] - banded tonal matching curve
//! - [`resample`] - rational-rate conversion to the fixed analysis rate
//!
//! The optional `serde` feature derives Serialize/Deserialize on the
//! result types so the CLI can persist recommendations.

pub mod dynamics;
pub mod eq_match;
pub mod features;
pub mod fft;
pub mod hpss;
pub mod integrity;
pub mod metering;
pub mod recommend;
pub mod resample;

pub use eq_match::{EQ_BAND_COUNT, EqBand, eq_match};
pub use features::{FEATURE_FFT_SIZE, SourceFeatures, extract};
pub use fft::{Fft, Window};
pub use hpss::{HPSS_FFT_SIZE, HPSS_HOP, HpssSeparation, separate};
pub use integrity::{IntegrityMetrics, IntegrityMonitor, true_peak};
pub use metering::{METER_FFT_SIZE, MeteringAnalyzer, SPECTRUM_BINS, SpectralFrame};
pub use recommend::{InstrumentCategory, recommend};
pub use resample::{ANALYSIS_RATE, resample, resample_to};
