//! Archive handling for inbox normalization
//!
//! ZIP, RAR and 7Z inputs are handled behind one capability: list entry
//! names + extract to a path. The normalization algorithm is written once
//! against that capability (see [`normalize`]).

pub mod layout;
pub mod normalize;
mod rar;
mod sevenz;
mod zip_file;

use std::path::Path;

use cpdb_common::Result;

pub use layout::ArchiveLayout;
pub use normalize::{normalize_archive, normalize_inbox};

/// Minimal capability every supported archive format provides.
pub trait ArchiveReader {
    /// Full entry-name list, in archive order. Directory entries may or may
    /// not be present depending on the format; path separators are not
    /// normalized here.
    fn entry_names(&mut self) -> Result<Vec<String>>;

    /// Extract every entry into `dest`, preserving relative paths.
    fn extract_to(&mut self, dest: &Path) -> Result<()>;
}

/// Supported archive formats, detected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    Rar,
    SevenZ,
}

impl ArchiveKind {
    /// Detect the archive kind from a path's extension.
    pub fn detect(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "zip" => Some(Self::Zip),
            "rar" => Some(Self::Rar),
            "7z" => Some(Self::SevenZ),
            _ => None,
        }
    }

    /// Open `path` as this kind of archive. Fails if the file cannot be
    /// opened or its signature does not validate.
    pub fn open(self, path: &Path) -> Result<Box<dyn ArchiveReader + Send>> {
        match self {
            Self::Zip => Ok(Box::new(zip_file::ZipArchiveFile::open(path)?)),
            Self::Rar => Ok(Box::new(rar::RarArchiveFile::open(path)?)),
            Self::SevenZ => Ok(Box::new(sevenz::SevenZArchiveFile::open(path)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_detect_by_extension() {
        assert_eq!(ArchiveKind::detect(Path::new("a.zip")), Some(ArchiveKind::Zip));
        assert_eq!(ArchiveKind::detect(Path::new("a.RAR")), Some(ArchiveKind::Rar));
        assert_eq!(ArchiveKind::detect(Path::new("a.7z")), Some(ArchiveKind::SevenZ));
        assert_eq!(ArchiveKind::detect(Path::new("a.tar")), None);
        assert_eq!(ArchiveKind::detect(&PathBuf::from("noext")), None);
    }
}
