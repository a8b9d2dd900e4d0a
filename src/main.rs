#![recursion_limit = "256"]

mod api;
mod config;
mod download;
mod extract;
mod status_bar;
mod sync;

use std::sync::Arc;

use anyhow::anyhow;
use tracing::warn;

// Animations and logging
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{Config, cli};
use crate::download::DownloadReport;

pub type Result<T> = anyhow::Result<T>;

#[tokio::main]
async fn main() -> crate::Result<()> {
    // Start logging
    let indicatif_layer = IndicatifLayer::new();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(indicatif_layer.get_stderr_writer())
                .compact(),
        )
        .with(indicatif_layer)
        .init();

    let cli = <cli::Cli as clap::Parser>::parse();

    // Configuration errors end the run before anything touches the network or disk
    let config = Arc::new(Config::from_cli(cli)?);

    let run = Config::run(config.clone()).await;
    finish(&config, run).await
}

/// Prints the summary, writes the log file and turns the outcome into the exit status
async fn finish(config: &Config, run: Result<Vec<DownloadReport>>) -> Result<()> {
    config.status_bar.print_summary().await;
    if let Some(log_file) = &config.log_file {
        if let Err(e) = config.status_bar.write_log_to_file(log_file).await {
            warn!("Could not write log file {}: {:#}", log_file.display(), e);
        }
    }

    let reports = run?;
    for report in reports.iter().filter(|report| report.result.is_err()) {
        warn!("Not downloaded: {}", report.url);
    }
    let failed = config.status_bar.errors().await;
    if failed > 0 {
        return Err(anyhow!("{} of {} downloads failed", failed, reports.len()));
    }
    Ok(())
}
