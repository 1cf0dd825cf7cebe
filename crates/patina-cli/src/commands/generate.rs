//! Generate test signals for exercising the pipeline.

use clap::Args;
use std::f32::consts::PI;
use std::path::PathBuf;

use patina_io::{WavSpec, write_wav};

#[derive(Args)]
pub struct GenerateArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Signal type: sine, sweep, pluck
    #[arg(long, default_value = "sine")]
    signal: String,

    /// Frequency in Hz (start frequency for sweeps)
    #[arg(long, default_value = "1000.0")]
    freq: f32,

    /// Duration in seconds
    #[arg(long, default_value = "2.0")]
    duration: f32,

    /// Peak amplitude, 0..1
    #[arg(long, default_value = "0.5")]
    amplitude: f32,

    /// Sample rate in Hz
    #[arg(long, default_value = "48000")]
    sample_rate: u32,
}

pub fn run(args: GenerateArgs) -> anyhow::Result<()> {
    let sr = args.sample_rate as f32;
    let len = (args.duration * sr) as usize;
    let amplitude = args.amplitude.clamp(0.0, 1.0);

    let samples: Vec<f32> = match args.signal.to_lowercase().as_str() {
        "sweep" => {
            // Log sweep from `freq` up to just below Nyquist.
            let end = sr * 0.45;
            let ratio = (end / args.freq).ln();
            let mut phase = 0.0f32;
            (0..len)
                .map(|i| {
                    let t = i as f32 / len as f32;
                    let freq = args.freq * (ratio * t).exp();
                    phase += 2.0 * PI * freq / sr;
                    amplitude * phase.sin()
                })
                .collect()
        }
        "pluck" => (0..len)
            .map(|i| {
                let t = i as f32 / sr;
                let envelope = (-4.0 * t).exp();
                amplitude
                    * envelope
                    * ((2.0 * PI * args.freq * t).sin()
                        + 0.4 * (2.0 * PI * args.freq * 2.0 * t).sin())
            })
            .collect(),
        _ => (0..len)
            .map(|i| amplitude * (2.0 * PI * args.freq * i as f32 / sr).sin())
            .collect(),
    };

    write_wav(
        &args.output,
        &samples,
        WavSpec {
            sample_rate: args.sample_rate,
            ..WavSpec::default()
        },
    )?;
    println!(
        "Wrote {} ({:.1}s {} at {} Hz)",
        args.output.display(),
        args.duration,
        args.signal,
        args.sample_rate
    );
    Ok(())
}
