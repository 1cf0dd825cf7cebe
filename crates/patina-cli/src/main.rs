//! Patina CLI - offline evaluation harness for the saturation pipeline.

mod commands;
mod preset;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "patina")]
#[command(author, version, about = "Analog saturation pipeline harness", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a WAV file through the saturation engine
    Process(commands::process::ProcessArgs),

    /// Analyze a reference recording and recommend parameters
    Analyze(commands::analyze::AnalyzeArgs),

    /// Generate test signals
    Generate(commands::generate::GenerateArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Process(args) => commands::process::run(args),
        Commands::Analyze(args) => commands::analyze::run(args),
        Commands::Generate(args) => commands::generate::run(args),
    }
}
