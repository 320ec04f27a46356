//! Checksum & catalog synchronizer
//!
//! Single-threaded fan-in: takes the packaging outcomes, attaches checksums
//! to new artifacts, merges them into the catalog, and advances the
//! catalog's version/timestamp iff something was actually added.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use cpdb_common::catalog::Catalog;
use cpdb_common::Result;
use md5::{Digest, Md5};
use tracing::{info, warn};

use super::packager::PackOutcome;

/// Chunk size for streaming artifact checksums.
const CHECKSUM_BUF_SIZE: usize = 64 * 1024;

/// What the synchronizer did with this run's outcomes.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    /// Entries inserted into the catalog this run
    pub added: usize,
    /// Names classified as size-collision duplicates
    pub duplicates: Vec<String>,
    /// Names skipped because they were already cataloged
    pub skipped: usize,
    /// Packaged artifacts dropped because their checksum failed
    pub failed: usize,
}

/// Apply this run's outcomes to the catalog.
///
/// Checksums are computed here, strictly after packaging finished, so they
/// always describe the final artifact bytes. The catalog map orders itself
/// case-insensitively, so insertion order does not matter. `version` and
/// `updated_at_*` move only when at least one entry was added, which keeps
/// a no-new-content run byte-identical on disk.
pub fn synchronize(catalog: &mut Catalog, outcomes: Vec<PackOutcome>) -> SyncReport {
    let mut report = SyncReport::default();
    let total_packaged = outcomes
        .iter()
        .filter(|o| matches!(o, PackOutcome::Packaged(_)))
        .count();

    for outcome in outcomes {
        match outcome {
            PackOutcome::Packaged(packed) => {
                info!(
                    "({}/{}) Calculating checksums...",
                    report.added + report.failed + 1,
                    total_packaged
                );
                match file_checksum(&packed.artifact_path) {
                    Ok(checksum) => {
                        let mut entry = packed.entry;
                        entry.checksum = Some(checksum);
                        catalog.insert(packed.name, entry);
                        report.added += 1;
                    }
                    Err(e) => {
                        // Dropped from this run; the artifact is re-produced
                        // and re-checksummed on the next run.
                        warn!("Checksum failed for `{}`: {}", packed.name, e);
                        report.failed += 1;
                    }
                }
            }
            PackOutcome::Duplicate { name, .. } => report.duplicates.push(name),
            PackOutcome::Skipped { .. } => report.skipped += 1,
        }
    }

    if report.added > 0 {
        catalog.touch();
        info!("Updated at: {}", catalog.updated_at_iso);
        info!(
            "Added {} new clickpack(s), incremented version to {}",
            report.added, catalog.version
        );
    } else {
        info!("No new clickpacks were added, keeping existing timestamp and version");
    }

    report
}

/// Stream a whole file through MD5 in fixed-size chunks, hex digest out.
pub fn file_checksum(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Md5::new();
    let mut buf = vec![0u8; CHECKSUM_BUF_SIZE];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}
