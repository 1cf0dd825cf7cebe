//! Multi-rate interpolation family for the nonlinear stage.
//!
//! Four interchangeable up/downsampling strategies, one per
//! [`InterpMode`](crate::InterpMode):
//!
//! | Mode | Factor | Character |
//! |------|--------|-----------|
//! | [`HalfBand4x`] | 4 | Cheap linear-phase workhorse, zero latency |
//! | [`Sinc8x`] | 8 | Long Kaiser sinc, best rejection, fixed delay |
//! | [`Spline4x`] | 4 | Hermite spline, keeps transients sharp |
//! | [`Adaptive4x`] | 4/1 | Envelope-gated half-band with hysteresis |
//!
//! All variants share the same block contract: `up` produces
//! `n × factor` samples, `down` consumes a multiple of the factor
//! (odd remainders truncate), and blocks shorter than a filter's settling
//! length pick up minor edge inaccuracy from zero padding. Accepted: the
//! interpolators carry no state across blocks.

mod adaptive;
pub mod design;
mod fir;
mod halfband;
mod sinc;
mod spline;

pub use adaptive::{ADAPTIVE_FACTOR, Adaptive4x};
pub use halfband::{HALF_BAND_FACTOR, HalfBand4x};
pub use sinc::{SINC_FACTOR, Sinc8x};
pub use spline::{SPLINE_FACTOR, Spline4x};
