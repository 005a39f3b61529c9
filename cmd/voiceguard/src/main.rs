//! VoiceGuard CLI - train, inspect and serve the deepfake voice classifier.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{DatasetCommand, ExtractCommand, PredictCommand, ServeCommand, TrainCommand};

/// VoiceGuard CLI - REAL/FAKE voice classification.
///
/// Typical workflow:
///   1. voiceguard dataset --data data/        inspect the training set
///   2. voiceguard train --data data/          fit and save the model
///   3. voiceguard serve                       expose POST /predict
///
/// `extract` and `predict` run the same pipeline offline on a single file.
#[derive(Parser)]
#[command(name = "voiceguard")]
#[command(about = "Deepfake voice detection")]
#[command(version)]
pub struct Cli {
    /// Service config file (YAML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Resample audio to this rate before feature extraction
    #[arg(long, global = true)]
    pub sample_rate: Option<u32>,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP inference service
    Serve(ServeCommand),
    /// Train a model from a directory of REAL and FAKE clips
    Train(TrainCommand),
    /// Extract features for a dataset directory and print a summary
    Dataset(DatasetCommand),
    /// Print the feature vector of one clip
    Extract(ExtractCommand),
    /// Classify one clip with a saved model
    Predict(PredictCommand),
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Serve(cmd) => cmd.run(&cli).await,
        Commands::Train(cmd) => cmd.run(&cli),
        Commands::Dataset(cmd) => cmd.run(&cli),
        Commands::Extract(cmd) => cmd.run(&cli),
        Commands::Predict(cmd) => cmd.run(&cli),
    }
}
