//! cpdb-ix - ClickpackDB Indexer
//!
//! Normalizes the clickpack inbox, packages each distinct pack into a
//! reproducible ZIP artifact, and synchronizes the persistent catalog.

use anyhow::Result;
use clap::Parser;
use cpdb_common::human_size::format_human_size;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cpdb_ix::Config;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting cpdb-ix (ClickpackDB Indexer)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = Config::parse();
    let summary = cpdb_ix::pipeline::run(&config).await?;

    info!(
        "Removed {} duplicates in total: {}",
        summary.duplicates.len(),
        summary.duplicates.join(", ")
    );
    info!(
        "Final catalog consists of {} entries ({} before, {} added, {} skipped, {} failed)",
        summary.entries_after,
        summary.entries_before,
        summary.added,
        summary.skipped,
        summary.failed
    );
    info!(
        "Total catalog size (compressed): {}",
        format_human_size(summary.total_compressed)
    );
    info!(
        "Total catalog size (uncompressed): {}",
        format_human_size(summary.total_uncompressed)
    );

    Ok(())
}
