//! End-to-end indexing pipeline
//!
//! Load catalog -> normalize inbox -> bounded fan-out packaging -> fan-in
//! synchronization -> atomic catalog write. The catalog is read-only during
//! the fan-out; workers return outcomes and a single-threaded reducer
//! applies them, so no locking is needed around catalog state.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use cpdb_common::catalog::Catalog;
use cpdb_common::{Error, Result};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::archive;
use crate::config::Config;
use crate::services::packager::{self, PackOutcome};
use crate::services::synchronizer;

/// Sentinel kept in place when clearing the source directory.
const KEEP_FILE: &str = "put_clickpacks_here";

/// End-of-run counters.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub entries_before: usize,
    pub entries_after: usize,
    pub added: usize,
    pub skipped: usize,
    pub failed: usize,
    pub duplicates: Vec<String>,
    pub archives_normalized: usize,
    pub total_compressed: u64,
    pub total_uncompressed: u64,
}

/// Run the whole pipeline once.
///
/// Only setup failures (unreadable source directory, corrupt catalog file,
/// final write failure) return an error; per-pack failures are logged,
/// dropped from this run, and picked up again on the next one.
pub async fn run(config: &Config) -> Result<RunSummary> {
    info!("Source directory: {}", config.src.display());
    info!("Destination directory: {}", config.dst.display());

    if !config.src.is_dir() {
        return Err(Error::Config(format!(
            "source directory `{}` does not exist",
            config.src.display()
        )));
    }
    fs::create_dir_all(&config.dst)?;

    let mut catalog = Catalog::load(&config.db, &config.endpoint())?;
    let entries_before = catalog.clickpacks.len();

    let archives_normalized = archive::normalize_inbox(&config.src)?;

    let (outcomes, failed_packs) = package_all(config, &catalog).await?;

    let report = synchronizer::synchronize(&mut catalog, outcomes);
    catalog.save(&config.catalog_write_path(), config.debug)?;

    let (total_compressed, total_uncompressed) = catalog.total_sizes();
    let summary = RunSummary {
        entries_before,
        entries_after: catalog.clickpacks.len(),
        added: report.added,
        skipped: report.skipped,
        failed: report.failed + failed_packs,
        duplicates: report.duplicates,
        archives_normalized,
        total_compressed,
        total_uncompressed,
    };

    if config.delete_dirs {
        info!("Delete directories mode enabled - cleaning up after indexing");
        clear_directory(&config.src)?;
    }

    Ok(summary)
}

/// Fan out packaging across the inbox's top-level directories. Returns the
/// collected outcomes plus the number of packs whose task failed.
async fn package_all(config: &Config, catalog: &Catalog) -> Result<(Vec<PackOutcome>, usize)> {
    let mut names: Vec<String> = Vec::new();
    for dir_entry in fs::read_dir(&config.src)? {
        let dir_entry = dir_entry?;
        if dir_entry.file_type()?.is_dir() {
            names.push(dir_entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();

    let snapshot = Arc::new(catalog.clone());
    let semaphore = Arc::new(Semaphore::new(config.worker_count()));
    let mut join_set = JoinSet::new();

    for name in names {
        let snapshot = Arc::clone(&snapshot);
        let semaphore = Arc::clone(&semaphore);
        let src_dir = config.src.join(&name);
        let dst_dir = config.dst.clone();
        let delete_duplicates = config.delete_duplicates;

        join_set.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|e| Error::Internal(e.to_string()))?;
            let result = tokio::task::spawn_blocking(move || {
                packager::package_pack(&name, &src_dir, &dst_dir, &snapshot, delete_duplicates)
            })
            .await
            .map_err(|e| Error::Internal(format!("packaging task panicked: {}", e)))?;
            result
        });
    }

    // Fan-in: outcome order does not matter, the catalog orders itself.
    let mut outcomes = Vec::new();
    let mut failed = 0usize;
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok(Ok(outcome)) => outcomes.push(outcome),
            Ok(Err(e)) => {
                warn!("Packaging failed, will retry next run: {}", e);
                failed += 1;
            }
            Err(e) => {
                warn!("Packaging task aborted: {}", e);
                failed += 1;
            }
        }
    }
    Ok((outcomes, failed))
}

/// Remove everything inside `dir` except the sentinel file.
fn clear_directory(dir: &Path) -> Result<()> {
    for dir_entry in fs::read_dir(dir)? {
        let dir_entry = dir_entry?;
        let path = dir_entry.path();
        if dir_entry.file_name().to_string_lossy() == KEEP_FILE {
            continue;
        }
        info!("Removing {}", path.display());
        if dir_entry.file_type()?.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}
