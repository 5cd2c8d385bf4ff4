//! rollgate-plan
//!
//! Evaluates the blue-green cutover decisions for a snapshot of groups,
//! pods, events and instance status captured from a cluster. Nothing is
//! listed or changed; the report goes to stdout as JSON, logs to stderr.

use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod snapshot;

use snapshot::Snapshot;

#[derive(Debug, Parser)]
#[command(name = "rollgate-plan", version, about)]
struct Cli {
    /// Snapshot file (JSON).
    #[arg(long, env = "ROLLGATE_SNAPSHOT")]
    snapshot: PathBuf,

    /// Evaluate as of this RFC 3339 time instead of now.
    #[arg(long)]
    now: Option<DateTime<Utc>>,

    /// Print the report on a single line.
    #[arg(long)]
    compact: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::Config::from_env()?;

    // Initialize tracing (prefer RUST_LOG, fallback to ROLLGATE_LOG_LEVEL)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.clone().into()))
        .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
        .init();

    info!(snapshot = %cli.snapshot.display(), "Evaluating snapshot");

    let snapshot = Snapshot::load(&cli.snapshot)?;
    let strategy = snapshot.effective_strategy(&config)?;
    info!(
        initial_delay_seconds = strategy.initial_delay_seconds,
        wait_takeover = strategy.evacuation_strategy.wait_takeover,
        revision_label_key = %config.revision_label_key,
        "Configuration loaded"
    );

    let now = cli.now.unwrap_or_else(Utc::now);
    let report = snapshot.evaluate(strategy, &config.revision_label_key, now);

    let out = if cli.compact {
        serde_json::to_string(&report)?
    } else {
        serde_json::to_string_pretty(&report)?
    };
    println!("{out}");

    Ok(())
}
