use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde_json::json;

use super::{extractor, loader, print_json, schema};
use crate::Cli;

/// Print the feature vector of one clip as JSON.
#[derive(Args)]
pub struct ExtractCommand {
    /// Audio file (WAV, FLAC, MP3, OGG Vorbis)
    file: PathBuf,

    /// Print the 42 values as a flat array only
    #[arg(long)]
    raw: bool,
}

impl ExtractCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let wave = loader(cli)
            .load_file(&self.file)
            .with_context(|| format!("load {}", self.file.display()))?;
        let extractor = extractor()?;
        let features = extractor
            .extract(&wave)
            .with_context(|| format!("extract features from {}", self.file.display()))?;

        if self.raw {
            return print_json(&features);
        }
        print_json(&json!({
            "file": self.file,
            "sample_rate": wave.sample_rate(),
            "duration_secs": wave.duration().as_secs_f64(),
            "schema": schema(cli, &extractor),
            "mfcc_mean": features.mfcc_mean(),
            "delta_mean": features.delta_mean(),
            "zero_crossing_rate": features.zero_crossing_rate(),
            "spectral_centroid": features.spectral_centroid(),
        }))
    }
}
