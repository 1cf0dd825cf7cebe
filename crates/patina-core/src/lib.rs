//! Patina Core - DSP primitives for the analog saturation pipeline
//!
//! This crate provides the real-time half of patina: the parameter model,
//! the multi-rate interpolation family, and the anti-aliased analog
//! shaping stage. Everything here is designed for zero allocation in the
//! audio path: buffers are pre-sized at construction and per-sample code
//! never touches the heap.
//!
//! # Core Pieces
//!
//! ## Parameters
//!
//! - [`ProcessorParams`] - The single strongly-typed parameter set,
//!   clamped once at the boundary with [`ProcessorParams::clamped`]
//! - [`CurveFamily`] / [`InterpMode`] - Waveshaper and oversampling
//!   selectors; the oversampling factor is a function of the mode
//!
//! ## Interpolation
//!
//! - [`HalfBand4x`] - Fixed 4x linear-phase up/down pair
//! - [`Sinc8x`] - 8x Kaiser-windowed sinc with a fixed group delay
//! - [`Spline4x`] - Transient-preserving cubic Hermite 4x
//! - [`Adaptive4x`] - Envelope-gated 4x with one block of hysteresis
//!
//! ## Shaping
//!
//! - [`AnalogShaper`] - Per-channel ADAA waveshaper with four curve
//!   families, DC blocking, tone tilt, and presence/warmth enhancement
//!
//! ## Utilities
//!
//! - [`db_to_linear`] / [`linear_to_db`], [`wet_dry_mix`], [`mono_sum`],
//!   [`ln_cosh`], [`flush_denormal`]
//!
//! # no_std Support
//!
//! The crate is `no_std` compatible (it needs `alloc` for construction
//! time filter design only). Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! patina-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use patina_core::{AnalogShaper, HalfBand4x, ProcessorParams};
//!
//! let params = ProcessorParams::default().clamped();
//! let mut up = HalfBand4x::new(256);
//! let mut shaper = AnalogShaper::new();
//! shaper.configure(&params);
//!
//! let input = [0.1f32; 256];
//! let mut oversampled = [0.0f32; 1024];
//! let mut output = [0.0f32; 256];
//!
//! up.up(&input, &mut oversampled);
//! shaper.process_block(&mut oversampled);
//! up.down(&oversampled, &mut output);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod interp;
pub mod math;
pub mod params;
pub mod shaper;

pub use interp::{
    ADAPTIVE_FACTOR, Adaptive4x, HALF_BAND_FACTOR, HalfBand4x, SINC_FACTOR, SPLINE_FACTOR, Sinc8x,
    Spline4x,
};
pub use math::{db_to_linear, flush_denormal, lerp, linear_to_db, ln_cosh, mono_sum, wet_dry_mix};
pub use params::{CurveFamily, InterpMode, ProcessorParams};
pub use shaper::{AnalogShaper, curve_eval};
