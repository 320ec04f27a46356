//! ZIP backend

use std::fs::File;
use std::path::{Path, PathBuf};

use cpdb_common::{Error, Result};
use zip::ZipArchive;

use super::ArchiveReader;

pub struct ZipArchiveFile {
    path: PathBuf,
    archive: ZipArchive<File>,
}

impl ZipArchiveFile {
    /// Open and validate the central directory; a corrupt file fails here.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let archive =
            ZipArchive::new(file).map_err(|e| Error::archive(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            archive,
        })
    }
}

impl ArchiveReader for ZipArchiveFile {
    fn entry_names(&mut self) -> Result<Vec<String>> {
        Ok(self.archive.file_names().map(str::to_string).collect())
    }

    fn extract_to(&mut self, dest: &Path) -> Result<()> {
        self.archive
            .extract(dest)
            .map_err(|e| Error::archive(&self.path, e))
    }
}
