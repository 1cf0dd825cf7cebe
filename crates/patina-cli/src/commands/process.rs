//! Process a WAV file through the saturation engine.

use clap::Args;
use std::path::PathBuf;

use patina_core::{CurveFamily, InterpMode, ProcessorParams};
use patina_engine::SaturationEngine;
use patina_io::{StereoSamples, read_wav_stereo, write_wav_stereo};

/// Block size used for offline processing. Mirrors a typical host buffer
/// so the engine runs the same code path it would live.
const BLOCK: usize = 512;

#[derive(Args)]
pub struct ProcessArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file
    #[arg(short, long)]
    output: PathBuf,

    /// Drive amount, 0..1
    #[arg(long, default_value = "0.5")]
    drive: f32,

    /// Character (tone tilt), 0..1
    #[arg(long, default_value = "0.5")]
    character: f32,

    /// Saturation hardness, 0..1
    #[arg(long, default_value = "0.5")]
    saturation: f32,

    /// Presence boost, 0..1
    #[arg(long, default_value = "0.5")]
    presence: f32,

    /// Warmth boost, 0..1
    #[arg(long, default_value = "0.5")]
    warmth: f32,

    /// Dry/wet mix, 0..1
    #[arg(long, default_value = "1.0")]
    mix: f32,

    /// Input gain in dB
    #[arg(long, default_value = "0.0")]
    input_gain: f32,

    /// Output trim in dB
    #[arg(long, default_value = "0.0")]
    output_gain: f32,

    /// Curve family: soft, warm, tape, vintage
    #[arg(long, default_value = "warm")]
    curve: String,

    /// Interpolation mode: halfband, sinc, spline, adaptive
    #[arg(long, default_value = "adaptive")]
    interp: String,

    /// Load parameters from a cached recommendation instead of the flags
    #[arg(long)]
    preset: Option<PathBuf>,
}

fn parse_curve(name: &str) -> CurveFamily {
    match name.to_lowercase().as_str() {
        "soft" => CurveFamily::Soft,
        "tape" => CurveFamily::Tape,
        "vintage" => CurveFamily::Vintage,
        "warm" => CurveFamily::Warm,
        other => {
            eprintln!("Unknown curve '{other}', using warm");
            CurveFamily::Warm
        }
    }
}

fn parse_interp(name: &str) -> InterpMode {
    match name.to_lowercase().as_str() {
        "halfband" | "hb4" => InterpMode::HalfBand4x,
        "sinc" | "sinc8" => InterpMode::Sinc8x,
        "spline" => InterpMode::Spline4x,
        "adaptive" => InterpMode::Adaptive,
        other => {
            eprintln!("Unknown interpolation mode '{other}', using adaptive");
            InterpMode::Adaptive
        }
    }
}

impl ProcessArgs {
    fn params(&self) -> anyhow::Result<ProcessorParams> {
        if let Some(preset_path) = &self.preset {
            let fingerprint = crate::preset::load(preset_path)?;
            return Ok(fingerprint.recommended);
        }
        Ok(ProcessorParams {
            drive: self.drive,
            character: self.character,
            saturation: self.saturation,
            presence: self.presence,
            warmth: self.warmth,
            mix: self.mix,
            input_gain_db: self.input_gain,
            output_gain_db: self.output_gain,
            curve: parse_curve(&self.curve),
            interp: parse_interp(&self.interp),
        }
        .clamped())
    }
}

pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    let (stereo, spec) = read_wav_stereo(&args.input)?;
    let frames = stereo.len();
    println!(
        "Processing {} ({} frames at {} Hz)...",
        args.input.display(),
        frames,
        spec.sample_rate
    );

    let params = args.params()?;
    let (mut engine, publisher) = SaturationEngine::new(spec.sample_rate as f32, BLOCK);
    publisher.publish(params);

    let mut out = StereoSamples {
        left: Vec::with_capacity(frames),
        right: Vec::with_capacity(frames),
    };
    let mut left_chunks = stereo.left.chunks(BLOCK);
    let mut right_chunks = stereo.right.chunks(BLOCK);
    loop {
        let (Some(l), Some(r)) = (left_chunks.next(), right_chunks.next()) else {
            break;
        };
        let mut left = l.to_vec();
        let mut right = r.to_vec();
        engine.process_block(&mut left, &mut right);
        out.left.extend_from_slice(&left);
        out.right.extend_from_slice(&right);
    }

    write_wav_stereo(&args.output, &out, spec)?;

    let metrics = engine.integrity();
    println!("Wrote {}", args.output.display());
    println!("  true-peak headroom: {:>6.1} dB", metrics.true_peak_headroom_db);
    println!(
        "  crest in/out:       {:>6.1} / {:.1} dB (delta {:+.1})",
        metrics.crest_in_db,
        metrics.crest_out_db,
        metrics.crest_delta_db()
    );
    println!(
        "  transients kept:    {:>6.0} %",
        metrics.transient_percent * 100.0
    );
    if params.interp == InterpMode::Sinc8x {
        println!("  latency:            {:>6} frames", engine.latency_samples());
    }
    Ok(())
}
