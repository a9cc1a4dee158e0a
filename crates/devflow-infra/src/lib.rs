//! Infrastructure layer for devflow.
//!
//! Data directory resolution, `config.toml` loading, and reading step
//! catalogs from disk.

pub mod catalog;
pub mod config;
pub mod filesystem;
