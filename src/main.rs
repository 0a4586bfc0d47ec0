//! Standalone transfer harness.
//!
//! Serves the harness handlers until Ctrl+C, then closes cleanly. Point a
//! browser or `transfer-cli` at the printed address.

use std::path::PathBuf;

use clap::Parser;
use transfer_harness::config::{load_config, HarnessConfig};
use transfer_harness::lifecycle::signals;
use transfer_harness::observability::{logging, metrics};
use transfer_harness::{DatasetSize, Harness};

#[derive(Parser)]
#[command(name = "transfer-harness")]
#[command(about = "Deterministic upload/download verification server", long_about = None)]
struct Args {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Write debug-level diagnostics to this file.
    #[arg(long)]
    logfile: Option<PathBuf>,

    /// Load a fixed dataset for /data (short = 500 KiB, long = 50 MiB).
    #[arg(long)]
    dataset: Option<DatasetSize>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => HarnessConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }
    if let Some(path) = args.logfile {
        config.observability.log_file = Some(path.to_string_lossy().into_owned());
    }
    if args.dataset.is_some() {
        config.dataset.preload = args.dataset;
    }

    logging::init(&config.observability.log_level);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        tls = config.listener.tls.is_some(),
        log_file = ?config.observability.log_file,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let harness = Harness::start(config).await?;
    harness.begin_scenario()?;
    println!("{}", harness.url("/"));

    signals::ctrl_c().await?;

    tracing::info!(
        uploads = harness.tracker().read(),
        failures = harness.tracker().failures(),
        "Final upload tally"
    );
    harness.end_scenario()?;
    harness.close().await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
