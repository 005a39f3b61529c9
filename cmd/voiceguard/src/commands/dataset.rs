use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use voiceguard_dataset::Dataset;

use super::{extractor, loader};
use crate::Cli;

/// Extract features for a dataset directory and print a summary.
#[derive(Args)]
pub struct DatasetCommand {
    /// Dataset root containing real/ and fake/
    #[arg(short, long)]
    data: PathBuf,

    /// Also write the extracted dataset as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl DatasetCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let extractor = extractor()?;
        let dataset = Dataset::load(&self.data, &loader(cli), &extractor)
            .with_context(|| format!("load dataset {}", self.data.display()))?;
        print!("{}", dataset);
        for skipped in &dataset.skipped {
            println!("  skipped {}: {}", skipped.path.display(), skipped.reason);
        }

        if let Some(path) = &self.output {
            dataset
                .save_json(path)
                .with_context(|| format!("write {}", path.display()))?;
            println!("Dataset written to {}", path.display());
        }
        Ok(())
    }
}
