//! Configuration for the indexer
//!
//! Flags mirror the historical CLI surface; every option can also come from
//! a `CPDB_*` environment variable.

use std::path::{Path, PathBuf};

use clap::Parser;

/// ClickpackDB indexer configuration
#[derive(Parser, Debug, Clone)]
#[command(name = "cpdb-ix", about = "ClickpackDB Indexer", version)]
pub struct Config {
    /// Source directory (inbox of clickpack directories and archives)
    #[arg(long, env = "CPDB_SRC", default_value = "ogg")]
    pub src: PathBuf,

    /// Destination directory for packaged artifacts
    #[arg(long, env = "CPDB_DST", default_value = "out")]
    pub dst: PathBuf,

    /// Catalog filename
    #[arg(long = "db", env = "CPDB_DB", default_value = "db.json")]
    pub db: PathBuf,

    /// Debug mode: pretty-print the catalog and write it to debug_<name>
    #[arg(long, env = "CPDB_DEBUG")]
    pub debug: bool,

    /// Delete duplicate clickpack directories from the source directory
    #[arg(long)]
    pub delete_duplicates: bool,

    /// Clear the source directory after indexing
    #[arg(long)]
    pub delete_dirs: bool,

    /// Hiatus API endpoint (stored in the catalog as-is)
    #[arg(long, env = "CPDB_HIATUS_ENDPOINT", default_value = "https://hiatus.zeo.lol")]
    pub hiatus_endpoint: String,

    /// Packaging worker pool size (defaults to available parallelism)
    #[arg(long, env = "CPDB_JOBS")]
    pub jobs: Option<usize>,
}

impl Config {
    /// Worker pool bound for the packaging fan-out.
    pub fn worker_count(&self) -> usize {
        self.jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        })
    }

    /// Endpoint with surrounding slashes trimmed.
    pub fn endpoint(&self) -> String {
        self.hiatus_endpoint.trim_matches('/').to_string()
    }

    /// Catalog path actually written this run. Debug mode redirects output to
    /// `debug_<name>` so a production catalog is never clobbered by a pretty
    /// one.
    pub fn catalog_write_path(&self) -> PathBuf {
        if self.debug {
            let name = self
                .db
                .file_name()
                .map(|n| format!("debug_{}", n.to_string_lossy()))
                .unwrap_or_else(|| "debug_db.json".to_string());
            match self.db.parent() {
                Some(parent) if parent != Path::new("") => parent.join(name),
                _ => PathBuf::from(name),
            }
        } else {
            self.db.clone()
        }
    }
}
