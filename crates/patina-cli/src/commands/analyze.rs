//! Analyze a reference recording and print/cache the recommendation.

use clap::Args;
use std::path::PathBuf;

use patina_analysis::InstrumentCategory;
use patina_engine::{AnalysisRequest, analyze};

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Reference WAV file to extract the character from
    #[arg(value_name = "REFERENCE")]
    reference: PathBuf,

    /// Source WAV file; enables the EQ matching curve
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// Instrument category bias: bass, vocal, drums, auto (or any free
    /// label, matched by substring)
    #[arg(short, long, default_value = "auto")]
    category: String,

    /// Write the fingerprint to `<DIR>/<label>_reco.json`
    #[arg(long, value_name = "DIR")]
    save_preset: Option<PathBuf>,

    /// Label for the cached preset (defaults to the category)
    #[arg(long)]
    label: Option<String>,

    /// Print the full fingerprint as JSON instead of a summary
    #[arg(long)]
    json: bool,
}

pub fn run(args: AnalyzeArgs) -> anyhow::Result<()> {
    let category = InstrumentCategory::from_label(&args.category);
    println!(
        "Analyzing {} ({:?} bias)...",
        args.reference.display(),
        category
    );

    let fingerprint = analyze(&AnalysisRequest {
        reference: args.reference.clone(),
        source: args.source.clone(),
        category,
    })?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&fingerprint)?);
    } else {
        let f = &fingerprint.features;
        println!("Features:");
        println!("  crest:    {:>7.1} dB", f.crest_db);
        println!("  rms:      {:>7.3}", f.rms);
        println!("  centroid: {:>7.0} Hz", f.centroid_hz);
        println!("  flatness: {:>7.3}", f.flatness);
        println!(
            "  bands L/M/H: {:.3} / {:.3} / {:.3}",
            f.band_low, f.band_mid, f.band_high
        );

        let p = fingerprint.recommended;
        println!("Recommended settings:");
        println!("  drive:      {:.2}", p.drive);
        println!("  character:  {:.2}", p.character);
        println!("  saturation: {:.2}", p.saturation);
        println!("  presence:   {:.2}", p.presence);
        println!("  interpolation: {:?}", p.interp);

        if let Some(bands) = &fingerprint.eq_match {
            println!("EQ match:");
            for band in bands {
                println!(
                    "  {:>6.0} - {:>6.0} Hz: {:+.1} dB",
                    band.lo_hz, band.hi_hz, band.gain_db
                );
            }
        }
    }

    if let Some(dir) = &args.save_preset {
        let label = args.label.clone().unwrap_or_else(|| args.category.clone());
        let path = crate::preset::save(dir, &label, &fingerprint)?;
        println!("Cached recommendation at {}", path.display());
    }

    Ok(())
}
