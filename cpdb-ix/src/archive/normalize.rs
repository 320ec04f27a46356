//! Inbox normalization
//!
//! Flattens every archive in the inbox into a single directory named after
//! the archive's base name, whatever the archive's internal layout was.

use std::fs;
use std::path::{Path, PathBuf};

use cpdb_common::{Error, Result};
use tracing::{info, warn};

use super::{layout, ArchiveKind, ArchiveReader};

/// Normalize one archive into `inbox/<base name>`.
///
/// Single-root archives are extracted through a scratch directory and their
/// root directory is renamed to the base name, replacing any pre-existing
/// directory of that name; everything else is extracted into a freshly
/// created base-name directory. Either way exactly one directory named
/// after the archive exists afterwards.
pub fn normalize_archive(path: &Path, inbox: &Path) -> Result<PathBuf> {
    let base = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| Error::archive(path, "archive has no usable base name"))?
        .to_string();

    let kind = ArchiveKind::detect(path)
        .ok_or_else(|| Error::archive(path, "unsupported archive extension"))?;
    let mut reader = kind.open(path)?;

    let names = reader.entry_names()?;
    let layout = layout::detect(&names);
    let target = inbox.join(&base);

    match layout.root_name {
        Some(root) if layout.has_single_root => {
            // Extract into a scratch directory first: extracting straight
            // into the inbox would merge with any pre-existing directory
            // named after the archive's root and let stale files survive.
            let staging = inbox.join(format!(".{}.extract", base));
            if staging.exists() {
                fs::remove_dir_all(&staging)?;
            }
            fs::create_dir_all(&staging)?;

            let extracted = staging.join(&root);
            let result = extract_via_staging(reader.as_mut(), &staging, &extracted, &target);
            let _ = fs::remove_dir_all(&staging);
            result?;
        }
        _ => {
            if target.exists() {
                fs::remove_dir_all(&target)?;
            }
            fs::create_dir_all(&target)?;
            reader.extract_to(&target)?;
        }
    }

    info!("Normalized `{}` into `{}`", path.display(), target.display());
    Ok(target)
}

/// Extract a single-root archive into `staging`, then move its root over
/// `target`, replacing whatever was there.
fn extract_via_staging(
    reader: &mut (dyn ArchiveReader + Send),
    staging: &Path,
    extracted: &Path,
    target: &Path,
) -> Result<()> {
    reader.extract_to(staging)?;
    if target.exists() {
        fs::remove_dir_all(target)?;
    }
    fs::rename(extracted, target)?;
    Ok(())
}

/// Normalize every archive found at the top level of `inbox`.
///
/// Archives that fail to open or extract are logged and skipped; they never
/// abort the batch. Successfully normalized archives are removed so re-runs
/// see only the flattened directories.
pub fn normalize_inbox(inbox: &Path) -> Result<usize> {
    let mut normalized = 0;

    for dir_entry in fs::read_dir(inbox)? {
        let dir_entry = dir_entry?;
        let path = dir_entry.path();
        if !dir_entry.file_type()?.is_file() || ArchiveKind::detect(&path).is_none() {
            continue;
        }

        match normalize_archive(&path, inbox) {
            Ok(_) => {
                normalized += 1;
                if let Err(e) = fs::remove_file(&path) {
                    warn!("Could not remove processed archive `{}`: {}", path.display(), e);
                }
            }
            Err(e) => {
                warn!("Skipping archive `{}`: {}", path.display(), e);
            }
        }
    }

    Ok(normalized)
}
