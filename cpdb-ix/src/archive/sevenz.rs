//! 7Z backend

use std::path::{Path, PathBuf};

use cpdb_common::{Error, Result};
use sevenz_rust::{Password, SevenZReader};

use super::ArchiveReader;

pub struct SevenZArchiveFile {
    path: PathBuf,
}

impl SevenZArchiveFile {
    /// Validate the archive by reading its header tables once.
    pub fn open(path: &Path) -> Result<Self> {
        SevenZReader::open(path, Password::empty())
            .map_err(|e| Error::archive(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }
}

impl ArchiveReader for SevenZArchiveFile {
    fn entry_names(&mut self) -> Result<Vec<String>> {
        let reader = SevenZReader::open(&self.path, Password::empty())
            .map_err(|e| Error::archive(&self.path, e))?;
        Ok(reader
            .archive()
            .files
            .iter()
            .map(|entry| entry.name().to_string())
            .collect())
    }

    fn extract_to(&mut self, dest: &Path) -> Result<()> {
        sevenz_rust::decompress_file(&self.path, dest)
            .map_err(|e| Error::archive(&self.path, e))
    }
}
