//! HTTP inference service.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::info;
use voiceguard_service::{start_server, ServiceConfig};

use crate::Cli;

/// Run the HTTP inference service.
///
/// The model is loaded before the listener binds; a missing or mismatched
/// model stops the process with an error.
#[derive(Args)]
pub struct ServeCommand {
    /// Listen address, e.g. ":8000" or "127.0.0.1:8000"
    #[arg(short, long)]
    listen: Option<String>,

    /// Model artifact path
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Directory for per-request upload files (default: decode in memory)
    #[arg(long)]
    spool_dir: Option<PathBuf>,
}

impl ServeCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let mut cfg = match &cli.config {
            Some(path) => ServiceConfig::load(path)
                .with_context(|| format!("load config {}", path.display()))?,
            None => ServiceConfig::default(),
        };
        if let Some(listen) = &self.listen {
            cfg.listen = listen.clone();
        }
        if let Some(model) = &self.model {
            cfg.model_path = model.clone();
        }
        if let Some(dir) = &self.spool_dir {
            cfg.spool_dir = Some(dir.clone());
        }
        if cli.sample_rate.is_some() {
            cfg.target_sample_rate = cli.sample_rate;
        }

        info!(listen = %cfg.listen, model = %cfg.model_path.display(), "starting service");
        start_server(cfg).await.context("voiceguard service failed")
    }
}
