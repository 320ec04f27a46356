//! Persistent catalog data model
//!
//! The catalog is a single UTF-8 JSON file mapping clickpack names to
//! artifact metadata. It is loaded once at startup, mutated in place by the
//! synchronizer after packaging finishes, and written back atomically at the
//! end of the run.
//!
//! On-disk field names are stable; downstream consumers parse this file
//! directly.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::time;

/// Base URL that artifact download links are derived from.
pub const BASE_URL: &str = "https://github.com/zeozeozeo/clickpack-db/raw/main/out/";

/// Derive the download URL for a pack name (percent-encoded).
pub fn url_for(name: &str) -> String {
    format!("{}{}.zip", BASE_URL, urlencoding::encode(name))
}

/// Catalog key ordered case-insensitively.
///
/// The catalog must always serialize with its keys in case-insensitive
/// ascending order, regardless of insertion order. Keeping the ordering in
/// the key type means every `BTreeMap` iteration (and therefore every
/// serialization) is already sorted; no explicit re-sort pass is needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackName(String);

impl PackName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Ord for PackName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .to_lowercase()
            .cmp(&other.0.to_lowercase())
            // Ties between same-letters-different-case keys stay deterministic
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for PackName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for PackName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PackName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// Metadata for one packaged clickpack artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Artifact (compressed) size in bytes
    pub size: u64,
    /// Aggregate on-disk size of the source directory in bytes
    pub uncompressed_size: u64,
    /// Whether any filename matched the noise-marker vocabulary
    pub has_noise: bool,
    /// Download URL, derived from the pack name
    pub url: String,
    /// ISO-8601 timestamp set when the entry was first created
    pub added_at: String,
    /// Contents of the first `.txt` file found in the pack, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme: Option<String>,
    /// Hex digest of the final artifact bytes; attached by the synchronizer
    /// strictly after packaging completes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

/// The persistent catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    /// Last-updated timestamp, ISO-8601
    #[serde(default)]
    pub updated_at_iso: String,
    /// Last-updated timestamp, Unix epoch seconds
    #[serde(default)]
    pub updated_at_unix: i64,
    /// Incremented by exactly 1 whenever a run adds at least one entry
    #[serde(default)]
    pub version: u64,
    /// Pack name -> artifact metadata, case-insensitively ordered
    #[serde(default)]
    pub clickpacks: BTreeMap<PackName, Entry>,
    /// Opaque endpoint passthrough value
    #[serde(default)]
    pub hiatus: String,
}

impl Catalog {
    /// Fresh empty catalog carrying the configured endpoint.
    pub fn new(endpoint: &str) -> Self {
        Self {
            updated_at_iso: String::new(),
            updated_at_unix: 0,
            version: 0,
            clickpacks: BTreeMap::new(),
            hiatus: endpoint.to_string(),
        }
    }

    /// Load the catalog from `path`, or start a fresh one if the file does
    /// not exist. A file that exists but fails to parse is fatal: merging
    /// into a half-understood catalog could drop entries on the next save.
    ///
    /// Missing top-level fields in older catalog files are filled with
    /// defaults, and every entry URL is re-derived from the current base URL.
    pub fn load(path: &Path, endpoint: &str) -> Result<Self> {
        if !path.exists() {
            info!("No catalog at {}, starting fresh", path.display());
            return Ok(Self::new(endpoint));
        }

        info!("Loading catalog from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let mut catalog: Catalog = serde_json::from_str(&contents)?;
        catalog.hiatus = endpoint.to_string();
        catalog.refresh_urls();
        info!("Initial catalog consists of {} entries", catalog.clickpacks.len());
        Ok(catalog)
    }

    /// Re-derive every entry's URL from the fixed base URL. Keeps old
    /// catalogs consistent after base-URL or encoding changes.
    pub fn refresh_urls(&mut self) {
        for (name, entry) in self.clickpacks.iter_mut() {
            entry.url = url_for(name.as_str());
        }
    }

    /// Whether `name` is already cataloged.
    pub fn contains(&self, name: &str) -> bool {
        self.clickpacks.contains_key(&PackName::from(name))
    }

    /// Whether any existing entry has this aggregate uncompressed size.
    /// This is the duplicate-detection key (cheap aggregate-size heuristic).
    pub fn has_uncompressed_size(&self, size: u64) -> bool {
        self.clickpacks
            .values()
            .any(|entry| entry.uncompressed_size == size)
    }

    /// Insert an entry; the map keeps itself case-insensitively ordered.
    pub fn insert(&mut self, name: impl Into<String>, entry: Entry) {
        self.clickpacks.insert(PackName::new(name), entry);
    }

    /// Advance `updated_at_*` to the current instant and bump `version`.
    /// Called iff at least one entry was added this run.
    pub fn touch(&mut self) {
        let now = time::now();
        self.updated_at_iso = time::to_iso(now);
        self.updated_at_unix = time::to_unix(now);
        self.version += 1;
    }

    /// Sum of all entries' (compressed, uncompressed) sizes.
    pub fn total_sizes(&self) -> (u64, u64) {
        self.clickpacks.values().fold((0, 0), |(c, u), entry| {
            (c + entry.size, u + entry.uncompressed_size)
        })
    }

    /// Serialize to `path` atomically (temp file + rename).
    ///
    /// Compact output by default; `pretty` switches to indented output for
    /// human diffing. A run that added nothing re-serializes byte-identically
    /// since neither timestamps nor version were touched.
    pub fn save(&self, path: &Path, pretty: bool) -> Result<()> {
        let bytes = if pretty {
            let mut buf = Vec::new();
            let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
            let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
            self.serialize(&mut ser)?;
            buf
        } else {
            serde_json::to_vec(self)?
        };

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, &bytes)?;
        fs::rename(&tmp_path, path)?;
        debug!(
            "Catalog saved to {} ({} entries, {} bytes)",
            path.display(),
            self.clickpacks.len(),
            bytes.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(uncompressed: u64) -> Entry {
        Entry {
            size: uncompressed / 2,
            uncompressed_size: uncompressed,
            has_noise: false,
            url: String::new(),
            added_at: "2024-01-01T00:00:00.000000+00:00".to_string(),
            readme: None,
            checksum: None,
        }
    }

    #[test]
    fn test_url_for_percent_encodes() {
        assert_eq!(
            url_for("my pack"),
            format!("{}my%20pack.zip", BASE_URL)
        );
        assert_eq!(url_for("plain"), format!("{}plain.zip", BASE_URL));
    }

    #[test]
    fn test_keys_order_case_insensitively() {
        let mut catalog = Catalog::new("");
        catalog.insert("zeta", entry(1));
        catalog.insert("Alpha", entry(2));
        catalog.insert("beta", entry(3));

        let keys: Vec<&str> = catalog.clickpacks.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["Alpha", "beta", "zeta"]);
    }

    #[test]
    fn test_case_tie_is_deterministic() {
        let mut catalog = Catalog::new("");
        catalog.insert("Pack", entry(1));
        catalog.insert("pack", entry(2));
        let keys: Vec<&str> = catalog.clickpacks.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["Pack", "pack"]);
    }

    #[test]
    fn test_duplicate_size_detection() {
        let mut catalog = Catalog::new("");
        catalog.insert("pack_b", entry(1000));
        assert!(catalog.has_uncompressed_size(1000));
        assert!(!catalog.has_uncompressed_size(1001));
    }

    #[test]
    fn test_touch_bumps_version_once() {
        let mut catalog = Catalog::new("");
        assert_eq!(catalog.version, 0);
        catalog.touch();
        assert_eq!(catalog.version, 1);
        assert!(!catalog.updated_at_iso.is_empty());
        assert!(catalog.updated_at_unix > 0);
    }

    #[test]
    fn test_save_load_roundtrip_compact() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("db.json");

        let mut catalog = Catalog::new("https://example.invalid");
        catalog.insert("mypack", entry(4096));
        catalog.touch();
        catalog.save(&path, false).unwrap();

        // Compact mode must not contain any indentation whitespace
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(!raw.contains('\n'));

        let loaded = Catalog::load(&path, "https://example.invalid").unwrap();
        assert_eq!(loaded.version, 1);
        assert_eq!(loaded.clickpacks.len(), 1);
        // URLs are re-derived on load
        assert_eq!(
            loaded.clickpacks.values().next().unwrap().url,
            url_for("mypack")
        );
    }

    #[test]
    fn test_save_pretty_is_indented() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("db.json");

        let mut catalog = Catalog::new("");
        catalog.insert("mypack", entry(4096));
        catalog.save(&path, true).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\n    \"version\""));
    }

    #[test]
    fn test_missing_file_starts_fresh() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.json");
        let catalog = Catalog::load(&path, "ep").unwrap();
        assert_eq!(catalog.version, 0);
        assert!(catalog.clickpacks.is_empty());
        assert_eq!(catalog.hiatus, "ep");
    }

    #[test]
    fn test_corrupt_file_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("db.json");
        std::fs::write(&path, b"{not json").unwrap();
        assert!(Catalog::load(&path, "").is_err());
    }

    #[test]
    fn test_missing_fields_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("db.json");
        std::fs::write(&path, br#"{"clickpacks":{}}"#).unwrap();
        let catalog = Catalog::load(&path, "ep").unwrap();
        assert_eq!(catalog.version, 0);
        assert_eq!(catalog.updated_at_unix, 0);
        assert_eq!(catalog.hiatus, "ep");
    }

    #[test]
    fn test_readme_and_checksum_omitted_when_absent() {
        let mut catalog = Catalog::new("");
        catalog.insert("p", entry(1));
        let json = serde_json::to_string(&catalog).unwrap();
        assert!(!json.contains("readme"));
        assert!(!json.contains("checksum"));
    }
}
