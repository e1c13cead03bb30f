//! churnd binary entry point.
//!
//! Periodically restarts a batch of containers from a configured fleet,
//! but only once the whole fleet has been observed healthy, to validate
//! that the system under test tolerates node churn.
//!
//! Usage:
//! ```bash
//! churnd --config churn.toml
//! RUST_LOG=info churnd --config churn.toml
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

mod config;
mod monitor;

use churn_client::{DockerProbe, LeaderProbe, RuntimeProbe};
use config::{Config, LogFormat};
use monitor::Monitor;

/// Restart healthy container fleets to test resilience.
#[derive(Parser, Debug)]
#[command(name = "churnd")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "churn.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::from_file(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;

    init_tracing(config.log.format);

    config.validate().context("invalid configuration")?;
    let fleet = config.fleet().context("invalid fleet configuration")?;

    let probe = Arc::new(
        DockerProbe::with_local_defaults(
            Duration::from_secs(config.probe.timeout_secs),
            Duration::from_secs(config.probe.restart_stop_timeout_secs),
        )
        .context("failed to connect to the Docker daemon")?,
    );
    let runtime: Arc<dyn RuntimeProbe> = probe.clone();
    let leadership: Arc<dyn LeaderProbe> = probe;

    let monitor = Monitor::new(&config, fleet, runtime, leadership);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(monitor.run(shutdown_rx));

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;

    tracing::info!("ctrl-c received, shutting down");
    shutdown_tx.send(true).ok();

    handle.await.context("monitor task panicked")?;

    Ok(())
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` controls the filter; the fallback level is debug.
fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"));

    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        LogFormat::Console => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}
