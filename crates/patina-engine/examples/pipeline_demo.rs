//! Run a synthesized guitar-ish signal through the full pipeline and
//! print the integrity metrics per interpolation mode.
//!
//! Run with: cargo run -p patina-engine --example pipeline_demo
#![allow(missing_docs)]

use patina_core::{CurveFamily, InterpMode, ProcessorParams};
use patina_engine::SaturationEngine;
use std::f32::consts::PI;

fn plucked_tone(len: usize, sample_rate: f32) -> Vec<f32> {
    (0..len)
        .map(|i| {
            let t = i as f32 / sample_rate;
            let envelope = (-3.0 * t).exp();
            envelope
                * (0.6 * (2.0 * PI * 196.0 * t).sin()
                    + 0.25 * (2.0 * PI * 392.0 * t).sin()
                    + 0.1 * (2.0 * PI * 588.0 * t).sin())
        })
        .collect()
}

fn main() {
    const SAMPLE_RATE: f32 = 48000.0;
    const BLOCK: usize = 512;

    let signal = plucked_tone(48000, SAMPLE_RATE);

    for interp in [
        InterpMode::HalfBand4x,
        InterpMode::Sinc8x,
        InterpMode::Spline4x,
        InterpMode::Adaptive,
    ] {
        let (mut engine, params) = SaturationEngine::new(SAMPLE_RATE, BLOCK);
        params.publish(ProcessorParams {
            drive: 0.65,
            saturation: 0.6,
            curve: CurveFamily::Warm,
            interp,
            ..ProcessorParams::default()
        });

        for chunk in signal.chunks(BLOCK) {
            let mut left = chunk.to_vec();
            let mut right = chunk.to_vec();
            engine.process_block(&mut left, &mut right);
        }

        let m = engine.integrity();
        println!(
            "{interp:?}: headroom {:.1} dB, crest in/out {:.1}/{:.1} dB, transients {:.0}%",
            m.true_peak_headroom_db,
            m.crest_in_db,
            m.crest_out_db,
            m.transient_percent * 100.0
        );
    }
}
