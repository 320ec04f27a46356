//! Archive structure detection
//!
//! Decides whether an archive's entries all live under a single top-level
//! directory, which controls how normalization extracts it.

use std::collections::BTreeSet;

/// Ephemeral descriptor of an archive's top-level structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveLayout {
    pub has_single_root: bool,
    pub root_name: Option<String>,
}

/// Compute the layout from the full entry-name list.
///
/// Single-root requires exactly one distinct top-level component *and* at
/// least one entry nested under it. A lone file whose name happens to match
/// the component (e.g. an archive containing only `mypack`) is not a root
/// directory.
pub fn detect(entry_names: &[String]) -> ArchiveLayout {
    let normalized: Vec<String> = entry_names
        .iter()
        .map(|name| name.replace('\\', "/"))
        .map(|name| name.trim_start_matches('/').to_string())
        .filter(|name| !name.is_empty())
        .collect();

    let mut roots = BTreeSet::new();
    for name in &normalized {
        if let Some(first) = name.split('/').next() {
            roots.insert(first.to_string());
        }
    }

    if roots.len() == 1 {
        if let Some(root) = roots.into_iter().next() {
            let prefix = format!("{}/", root);
            let nested = normalized
                .iter()
                .any(|name| name.len() > prefix.len() && name.starts_with(&prefix));
            if nested {
                return ArchiveLayout {
                    has_single_root: true,
                    root_name: Some(root),
                };
            }
        }
    }

    ArchiveLayout {
        has_single_root: false,
        root_name: None,
    }
}
