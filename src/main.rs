//! hybridscan - Main Entry Point
//!
//! Train hybrid KMeans + SVM models and scan data files from the command line.

use clap::Parser;
use hybridscan::cli::{run, Cli};
use hybridscan::config::PipelineSettings;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hybridscan=info".into()),
        )
        .init();

    let cli = Cli::parse();
    run(cli, PipelineSettings::from_env())
}
