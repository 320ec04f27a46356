//! # ClickpackDB Common Library
//!
//! Shared code for the ClickpackDB pipeline tools including:
//! - The persistent catalog data model (load / merge / save)
//! - Common error types
//! - Timestamp utilities
//! - Human-readable byte size formatting

pub mod catalog;
pub mod error;
pub mod human_size;
pub mod time;

pub use error::{Error, Result};
