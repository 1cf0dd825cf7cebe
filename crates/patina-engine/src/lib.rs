//! Patina Engine - the assembled saturation pipeline
//!
//! Ties the workspace together: [`SaturationEngine`] runs the real-time
//! block path (interpolate up → shape → interpolate down → mix → meter),
//! [`bus`] hands parameters across the thread boundary tear-free, and
//! [`analyzer`] runs the offline reference analysis on a worker thread.
//!
//! # Threading model
//!
//! - The audio thread owns the engine and calls
//!   [`SaturationEngine::process_block`] from its callback. That path
//!   never allocates, locks, or blocks.
//! - The control thread owns the [`ParamPublisher`] and the
//!   [`AnalysisWorker`]; analysis results only influence the engine when
//!   explicitly published through the same parameter bus the UI uses.
//!
//! # Example
//!
//! ```rust
//! use patina_engine::SaturationEngine;
//! use patina_core::{InterpMode, ProcessorParams};
//!
//! let (mut engine, params) = SaturationEngine::new(48000.0, 512);
//! params.publish(ProcessorParams {
//!     drive: 0.7,
//!     interp: InterpMode::HalfBand4x,
//!     ..ProcessorParams::default()
//! });
//!
//! let mut left = vec![0.0f32; 512];
//! let mut right = vec![0.0f32; 512];
//! engine.process_block(&mut left, &mut right);
//!
//! let metrics = engine.integrity();
//! assert!(metrics.true_peak_headroom_db.is_finite());
//! ```

pub mod analyzer;
pub mod bus;
pub mod engine;

pub use analyzer::{
    AnalysisRequest, AnalysisWorker, AnalyzeError, MojoFingerprint, RequestToken, analyze,
};
pub use bus::{ParamPublisher, ParamReceiver, channel};
pub use engine::SaturationEngine;
