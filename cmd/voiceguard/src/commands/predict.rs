use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use voiceguard_classifier::Classifier;
use voiceguard_service::DEFAULT_MODEL_PATH;

use super::{extractor, loader, print_json, schema};
use crate::Cli;

/// Classify one clip with a saved model, without starting the service.
#[derive(Args)]
pub struct PredictCommand {
    /// Audio file (WAV, FLAC, MP3, OGG Vorbis)
    file: PathBuf,

    /// Model artifact path
    #[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
    model: PathBuf,
}

impl PredictCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let extractor = extractor()?;
        let classifier = Classifier::load(&self.model, &schema(cli, &extractor))
            .with_context(|| format!("load model {}", self.model.display()))?;

        let wave = loader(cli)
            .load_file(&self.file)
            .with_context(|| format!("load {}", self.file.display()))?;
        let features = extractor.extract(&wave).context("extract features")?;
        let prediction = classifier.score_vector(&features).context("score")?;
        print_json(&prediction)
    }
}
