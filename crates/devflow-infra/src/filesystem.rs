//! Data directory layout for devflow.
//!
//! Everything devflow reads from disk lives under one data directory:
//! `config.toml` plus any replacement catalogs it points to.

use std::path::{Path, PathBuf};

/// Environment variable that overrides the data directory.
pub const DATA_DIR_ENV: &str = "DEVFLOW_DATA_DIR";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `DEVFLOW_DATA_DIR` environment variable
/// 2. `~/.devflow`
/// 3. `.devflow` in the current directory
pub fn resolve_data_dir() -> PathBuf {
    resolve_data_dir_from(std::env::var(DATA_DIR_ENV).ok(), dirs::home_dir())
}

fn resolve_data_dir_from(env_dir: Option<String>, home: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = env_dir.filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }

    if let Some(home) = home {
        return home.join(".devflow");
    }

    PathBuf::from(".devflow")
}

/// `{data_dir}/config.toml`
pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join("config.toml")
}

/// Resolve a configured catalog path. Relative paths are anchored at the
/// data directory; absolute paths are used as-is.
pub fn resolve_catalog_path(data_dir: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        data_dir.join(configured)
    }
}
