//! Directory info scanner
//!
//! One walk over a clickpack directory producing its aggregate byte size, a
//! noise-marker flag, and the first readme found. Symbolic links contribute
//! nothing.

use std::fs;
use std::path::Path;

use cpdb_common::Result;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Filename substrings (case-insensitive) marking non-musical filler files.
pub const NOISE_MARKERS: [&str; 5] = ["noise", "whitenoise", "pcnoise", "background", "silence"];

/// Aggregate info for one clickpack directory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackInfo {
    /// Sum of on-disk file sizes in bytes
    pub total_bytes: u64,
    /// Whether any filename matched [`NOISE_MARKERS`]
    pub has_noise: bool,
    /// Contents of the first `.txt` file encountered, if any.
    /// Traversal order is filesystem-dependent; this is best-effort metadata.
    pub readme: Option<String>,
}

/// Scan `dir` recursively.
pub fn scan(dir: &Path) -> Result<PackInfo> {
    let mut info = PackInfo::default();

    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Error accessing entry under `{}`: {}", dir.display(), e);
                continue;
            }
        };

        if entry.path_is_symlink() || !entry.file_type().is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy();
        let lowered = file_name.to_lowercase();
        if NOISE_MARKERS.iter().any(|marker| lowered.contains(marker)) {
            info.has_noise = true;
        }

        if info.readme.is_none() && file_name.ends_with(".txt") {
            debug!("Found readme {}", file_name);
            match fs::read(entry.path()) {
                Ok(bytes) => info.readme = Some(String::from_utf8_lossy(&bytes).into_owned()),
                Err(e) => warn!("Could not read readme `{}`: {}", entry.path().display(), e),
            }
        }

        info.total_bytes += entry.metadata().map_err(std::io::Error::from)?.len();
    }

    Ok(info)
}
