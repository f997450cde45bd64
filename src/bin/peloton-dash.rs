// ABOUTME: peloton-dash entry point - fetches workout history and emits dashboard JSON
// ABOUTME: CLI parsing, logging init, config load, pipeline run, output serialization
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # peloton-dash
//!
//! Run-once batch job: authenticates with the configured credentials, pages
//! through the account's complete workout history, derives per-workout
//! metrics, and writes the aggregated dashboard document as JSON.
//!
//! Usage:
//! ```bash
//! # Credentials come from the environment
//! export PELOTON_USERNAME=rider@example.com
//! export PELOTON_PASSWORD=...
//!
//! # Dashboard JSON to stdout
//! peloton-dash
//!
//! # Dashboard JSON to a file, with an explicit recent-window cutoff
//! peloton-dash --output dashboard.json --recent-cutoff 2025-05-01T00:00:00Z
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use peloton_dash::config::{parse_cutoff, AppConfig};
use peloton_dash::logging::{init_logging, LoggingConfig};
use peloton_dash::pipeline;

#[derive(Parser)]
#[command(
    name = "peloton-dash",
    about = "Fetch Peloton workout history and build dashboard data",
    long_about = "Authenticates against the Peloton API, pages through the account's \
                  workout history, derives per-workout metrics, and emits the aggregated \
                  dashboard document as JSON for an external renderer."
)]
struct Cli {
    /// Write the dashboard JSON to this file instead of stdout
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Override the recent-window cutoff (RFC 3339, e.g. 2025-05-01T00:00:00Z)
    #[arg(long)]
    recent_cutoff: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    if cli.verbose {
        logging.level = "debug".to_owned();
    }
    init_logging(&logging)?;

    let mut config = AppConfig::from_env()?;
    if let Some(raw) = cli.recent_cutoff.as_deref() {
        config.derive.recent_cutoff = parse_cutoff(raw)?;
    }

    let dashboard = match pipeline::run(&config).await {
        Ok(dashboard) => dashboard,
        Err(e) => {
            error!("{e}");
            return Err(e.into());
        }
    };

    let json = serde_json::to_string_pretty(&dashboard)
        .context("failed to serialize dashboard document")?;

    match cli.output {
        Some(path) => {
            fs::write(&path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("Dashboard data written to {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}
