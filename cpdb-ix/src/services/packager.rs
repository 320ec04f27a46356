//! Packaging engine
//!
//! Turns one clickpack directory into one reproducible ZIP artifact plus a
//! provisional catalog entry. Runs concurrently across packs; it only reads
//! the catalog snapshot and touches its own directory and artifact file, so
//! the synchronizer can apply results single-threaded afterwards.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use cpdb_common::catalog::{self, Catalog, Entry};
use cpdb_common::human_size::format_human_size;
use cpdb_common::{time, Error, Result};
use tracing::{info, warn};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::pack_info;

/// A freshly produced artifact with its provisional entry (no checksum yet).
#[derive(Debug, Clone)]
pub struct PackedPack {
    pub name: String,
    pub artifact_path: PathBuf,
    pub entry: Entry,
}

/// Terminal classification of one pack directory for this run.
#[derive(Debug, Clone)]
pub enum PackOutcome {
    /// Already cataloged in a previous run
    Skipped { name: String },
    /// Aggregate size collides with an existing entry; no artifact produced
    Duplicate { name: String, uncompressed_size: u64 },
    /// Artifact produced, entry pending checksum + catalog insertion
    Packaged(PackedPack),
}

/// Package one pack directory into `dst_dir/<name>.zip`.
///
/// `catalog` is the read-only snapshot taken before the fan-out; no catalog
/// mutation happens here.
pub fn package_pack(
    name: &str,
    src_dir: &Path,
    dst_dir: &Path,
    catalog: &Catalog,
    delete_duplicates: bool,
) -> Result<PackOutcome> {
    if catalog.contains(name) {
        warn!("Skipping `{}`: key already in catalog", name);
        return Ok(PackOutcome::Skipped {
            name: name.to_string(),
        });
    }

    info!("Zipping `{}`...", name);
    let info = pack_info::scan(src_dir)?;

    if catalog.has_uncompressed_size(info.total_bytes) {
        info!("Found duplicate `{}` (size: {})", name, info.total_bytes);
        if delete_duplicates {
            info!("Deleting duplicate `{}`...", name);
            fs::remove_dir_all(src_dir)?;
        }
        return Ok(PackOutcome::Duplicate {
            name: name.to_string(),
            uncompressed_size: info.total_bytes,
        });
    }

    if info.has_noise {
        info!("Clickpack `{}` has a noise file", name);
    }

    let artifact_path = dst_dir.join(format!("{}.zip", name));
    let compressed_size = write_reproducible_zip(src_dir, &artifact_path)?;

    info!(
        "{}: {} => {}, -{}",
        name,
        format_human_size(info.total_bytes),
        format_human_size(compressed_size),
        format_human_size(info.total_bytes.saturating_sub(compressed_size))
    );

    let entry = Entry {
        size: compressed_size,
        uncompressed_size: info.total_bytes,
        has_noise: info.has_noise,
        url: catalog::url_for(name),
        added_at: time::to_iso(time::now()),
        readme: info.readme,
        checksum: None,
    };

    Ok(PackOutcome::Packaged(PackedPack {
        name: name.to_string(),
        artifact_path,
        entry,
    }))
}

/// Write a deterministic ZIP of `dir` to `zip_path` and return its size.
///
/// Entries are added in sorted relative-path order with a fixed timestamp
/// and fixed permissions, so identical input directories always produce
/// byte-identical artifacts (which is what makes the stored checksum a
/// meaningful stability signal across rebuilds).
fn write_reproducible_zip(dir: &Path, zip_path: &Path) -> Result<u64> {
    let mut arc_names: Vec<(String, PathBuf)> = Vec::new();
    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.path_is_symlink() || !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(dir)
            .map_err(|e| Error::Internal(format!("path outside pack dir: {}", e)))?;
        let arc_name = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        arc_names.push((arc_name, entry.path().to_path_buf()));
    }
    arc_names.sort_by(|a, b| a.0.cmp(&b.0));

    let file = File::create(zip_path)?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default())
        .unix_permissions(0o644);

    for (arc_name, path) in arc_names {
        writer
            .start_file(arc_name, options)
            .map_err(|e| Error::archive(zip_path, e))?;
        let mut src = File::open(&path)?;
        io::copy(&mut src, &mut writer)?;
    }
    writer.finish().map_err(|e| Error::archive(zip_path, e))?;

    Ok(fs::metadata(zip_path)?.len())
}
