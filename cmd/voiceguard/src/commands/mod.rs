//! CLI commands module.

mod dataset;
mod extract;
mod predict;
mod serve;
mod train;

pub use dataset::DatasetCommand;
pub use extract::ExtractCommand;
pub use predict::PredictCommand;
pub use serve::ServeCommand;
pub use train::TrainCommand;

use anyhow::Context;
use voiceguard_audio::{LoadOptions, Loader};
use voiceguard_features::{Extractor, FeatureConfig, FeatureSchema};

use crate::Cli;

/// Loader honoring the global `--sample-rate` flag.
pub(crate) fn loader(cli: &Cli) -> Loader {
    Loader::new(LoadOptions {
        target_sample_rate: cli.sample_rate,
    })
}

/// The extractor every command shares with the service.
pub(crate) fn extractor() -> anyhow::Result<Extractor> {
    Extractor::new(FeatureConfig::default()).context("build feature extractor")
}

/// The extractor's schema at the loader rate `--sample-rate` selects.
pub(crate) fn schema(cli: &Cli, extractor: &Extractor) -> FeatureSchema {
    extractor.schema().clone().with_sample_rate(cli.sample_rate)
}

/// Prints a value as pretty JSON on stdout.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
