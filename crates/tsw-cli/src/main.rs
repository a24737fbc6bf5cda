//! tsw entry point.
//!
//! This file is intentionally thin: it parses flags, sets up tracing, loads
//! the namespaces file, and hands everything to the sweep runner. All
//! decision logic lives in tsw-decision; all traversal lives in tsw-sweep.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::info;
use tsw_config::{clamp_threshold_days, load_namespaces, SweepSettings, DEFAULT_NAMESPACES_FILE};
use tsw_registry::DtrClient;
use tsw_sweep::SweepRunner;

/// Sweep registry namespaces and re-trigger stale vulnerability scans.
#[derive(Parser)]
#[command(name = "tsw")]
#[command(about = "Registry vulnerability scan sweeper", long_about = None)]
struct Cli {
    /// Registry user id
    #[arg(long, env = "TSW_USER")]
    user: String,

    /// Registry access token
    #[arg(long, env = "TSW_TOKEN", hide_env_values = true)]
    token: String,

    /// Registry URL
    #[arg(long, default_value = "https://dtr.company.com")]
    url: String,

    /// Namespaces file
    #[arg(long, default_value = DEFAULT_NAMESPACES_FILE)]
    file: String,

    /// Force a scan when the last completed one is older than this many days
    #[arg(long, default_value_t = 10_000)]
    days: i64,

    /// Start scans. Without this flag the sweep is a dry run: every decision
    /// is logged but no scan request is sent.
    #[arg(long = "no-dry-run", default_value_t = false)]
    no_dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env.local if present (dev convenience). Silent if the file does
    // not exist — production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    let cli = Cli::parse();
    init_tracing();

    let threshold_days = clamp_threshold_days(cli.days);
    // Scans only start when --no-dry-run is present; the default is a dry
    // run in which no tag is scanned.
    let dry_run = !cli.no_dry_run;

    let settings = SweepSettings {
        registry_url: cli.url.clone(),
        user: cli.user.clone(),
        namespaces_file: cli.file.clone(),
        threshold_days,
        dry_run,
    };
    let config_hash = settings.fingerprint()?;
    info!(
        user = %settings.user,
        file = %settings.namespaces_file,
        url = %settings.registry_url,
        threshold_days,
        dry_run,
        %config_hash,
        "starting sweep"
    );

    let ns = load_namespaces(&cli.file).context("error getting namespaces")?;

    let client = Arc::new(DtrClient::new(cli.url, cli.user, cli.token));
    let runner = SweepRunner::new(client, threshold_days, dry_run, Utc::now());
    let summary = runner.run(&ns.namespaces).await;

    info!(
        repositories = summary.repositories,
        tag_records = summary.tag_records,
        "reviewed {} repositories and {} tag records; repositories with no tags produce no output",
        summary.repositories,
        summary.tag_records
    );

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}
