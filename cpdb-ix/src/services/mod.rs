//! Pipeline services

pub mod pack_info;
pub mod packager;
pub mod synchronizer;
