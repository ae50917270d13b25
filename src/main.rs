//! sbom-atlas: multi-repository SBOM aggregation and dependency analysis.

use anyhow::Result;
use clap::{Parser, Subcommand};
use sbom_atlas::cli;
use sbom_atlas::config::{AtlasConfig, CONFIG_PATHS};
use std::io::Write as _;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sbom-atlas")]
#[command(version)]
#[command(about = "Multi-repository SBOM aggregation and dependency graph analysis", long_about = None)]
struct Cli {
    /// Path to a config file (defaults to the standard search paths)
    #[arg(long, global = true, env = "SBOM_ATLAS_CONFIG")]
    config: Option<PathBuf>,

    /// Write output to a file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a directory of SBOM files into an aggregate snapshot
    Analyze {
        /// Directory containing `owner__name.json` (or `owner/name.json`) SBOM files
        input_dir: PathBuf,
    },
    /// Merge partial snapshot files into one accumulated snapshot
    Merge {
        /// Snapshot files, oldest first
        inputs: Vec<PathBuf>,
        /// Treat the last input as the final complete payload
        #[arg(long)]
        r#final: bool,
    },
    /// Print the JSON schema of the snapshot export contract
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();
    let config = match &args.config {
        Some(path) => AtlasConfig::from_file(path)?,
        None => AtlasConfig::load_with_precedence(&CONFIG_PATHS)?,
    };

    let output = match args.command {
        Commands::Analyze { input_dir } => cli::run_analyze(&input_dir, &config).await?,
        Commands::Merge { inputs, r#final } => cli::run_merge(&inputs, r#final)?,
        Commands::Schema => cli::run_schema()?,
    };

    match args.output {
        Some(path) => std::fs::write(&path, output)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{output}")?;
        }
    }
    Ok(())
}
