//! cpdb-ix library interface
//!
//! Exposes the pipeline stages for integration testing: archive
//! normalization, pack scanning/packaging, and catalog synchronization.

pub mod archive;
pub mod config;
pub mod pipeline;
pub mod services;

pub use config::Config;
pub use pipeline::RunSummary;
