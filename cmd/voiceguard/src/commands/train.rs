//! Model training.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Args;
use tracing::info;
use voiceguard_classifier::{train, TrainConfig};
use voiceguard_dataset::Dataset;
use voiceguard_service::DEFAULT_MODEL_PATH;

use super::{extractor, loader, schema};
use crate::Cli;

/// Train a model from a directory of REAL and FAKE clips.
///
/// The data directory must contain `real/` and `fake/` subdirectories of
/// WAV files. Alternatively, `--features` reuses a JSON dataset written by
/// `voiceguard dataset --output`.
#[derive(Args)]
pub struct TrainCommand {
    /// Dataset root containing real/ and fake/
    #[arg(short, long, required_unless_present = "features")]
    data: Option<PathBuf>,

    /// Precomputed dataset JSON
    #[arg(long, conflicts_with = "data")]
    features: Option<PathBuf>,

    /// Where to write the model artifact
    #[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
    output: PathBuf,

    /// Training parameters (YAML, same fields as TrainConfig)
    #[arg(long)]
    params: Option<PathBuf>,

    /// Number of trees (overrides --params)
    #[arg(long)]
    trees: Option<usize>,

    /// Random seed for both the split and the forest (overrides --params)
    #[arg(long)]
    seed: Option<u64>,
}

impl TrainCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let cfg = self.train_config()?;
        let extractor = extractor()?;

        let dataset = match (&self.data, &self.features) {
            (_, Some(path)) => Dataset::load_json(path)
                .with_context(|| format!("read dataset {}", path.display()))?,
            (Some(root), None) => Dataset::load(root, &loader(cli), &extractor)
                .with_context(|| format!("load dataset {}", root.display()))?,
            (None, None) => bail!("either --data or --features is required"),
        };
        let schema = schema(cli, &extractor);
        if dataset.schema != schema {
            bail!(
                "dataset was extracted with {}, current extractor is {}",
                dataset.schema,
                schema
            );
        }
        print!("{}", dataset);

        let outcome = train(&dataset.samples, &schema, &cfg).context("train model")?;
        match &outcome.report {
            Some(report) => {
                println!("Accuracy: {:.4}", report.accuracy);
                println!("{}", report);
            }
            None => println!("Accuracy: n/a (no held-out samples)"),
        }

        outcome
            .artifact
            .save(&self.output)
            .with_context(|| format!("save model {}", self.output.display()))?;
        info!(path = %self.output.display(), "model saved");
        println!("Model saved to {}", self.output.display());
        Ok(())
    }

    fn train_config(&self) -> anyhow::Result<TrainConfig> {
        let mut cfg = match &self.params {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("read {}", path.display()))?;
                serde_yaml::from_str(&text)
                    .with_context(|| format!("parse {}", path.display()))?
            }
            None => TrainConfig::default(),
        };
        if let Some(trees) = self.trees {
            cfg.forest.n_estimators = trees;
        }
        if let Some(seed) = self.seed {
            cfg.forest.seed = seed;
            cfg.split_seed = seed;
        }
        Ok(cfg)
    }
}
