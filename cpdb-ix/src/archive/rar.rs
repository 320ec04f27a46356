//! RAR backend
//!
//! The unrar API opens the archive once per pass, so listing and extraction
//! each re-open from the stored path.

use std::path::{Path, PathBuf};

use cpdb_common::{Error, Result};
use unrar::Archive;

use super::ArchiveReader;

pub struct RarArchiveFile {
    path: PathBuf,
}

impl RarArchiveFile {
    /// Validate the archive signature by opening it for listing once.
    pub fn open(path: &Path) -> Result<Self> {
        Archive::new(path)
            .open_for_listing()
            .map_err(|e| Error::archive(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }
}

impl ArchiveReader for RarArchiveFile {
    fn entry_names(&mut self) -> Result<Vec<String>> {
        let archive = Archive::new(&self.path)
            .open_for_listing()
            .map_err(|e| Error::archive(&self.path, e))?;

        let mut names = Vec::new();
        for entry in archive {
            let header = entry.map_err(|e| Error::archive(&self.path, e))?;
            names.push(header.filename.to_string_lossy().into_owned());
        }
        Ok(names)
    }

    fn extract_to(&mut self, dest: &Path) -> Result<()> {
        let mut archive = Archive::new(&self.path)
            .open_for_processing()
            .map_err(|e| Error::archive(&self.path, e))?;

        while let Some(header) = archive
            .read_header()
            .map_err(|e| Error::archive(&self.path, e))?
        {
            archive = if header.entry().is_file() {
                header
                    .extract_with_base(dest)
                    .map_err(|e| Error::archive(&self.path, e))?
            } else {
                header.skip().map_err(|e| Error::archive(&self.path, e))?
            };
        }
        Ok(())
    }
}
