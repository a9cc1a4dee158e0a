//! Global configuration loader for devflow.
//!
//! Reads `config.toml` from the data directory (`~/.devflow/` in production)
//! and deserializes it into [`GlobalConfig`]. Falls back to defaults when the
//! file is missing or malformed.

use std::path::Path;

use devflow_types::config::{ConsensusConfig, GlobalConfig};

use crate::filesystem::config_path;

/// Minimum number of consensus rounds (safety floor).
const MIN_CONSENSUS_ROUNDS: u32 = 1;

/// Load global configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`GlobalConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_global_config(data_dir: &Path) -> GlobalConfig {
    let config_path = config_path(data_dir);

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
    };

    match toml::from_str::<GlobalConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            GlobalConfig::default()
        }
    }
}

/// Resolve consensus round limits.
///
/// `min_rounds` is floored at 1 and `max_rounds` is raised to at least
/// `min_rounds`, so a misconfigured file can never make consensus impossible.
pub fn resolve_consensus_config(global_config: &GlobalConfig) -> ConsensusConfig {
    let min_rounds = global_config.consensus.min_rounds.max(MIN_CONSENSUS_ROUNDS);
    let max_rounds = global_config.consensus.max_rounds.max(min_rounds);
    ConsensusConfig {
        min_rounds,
        max_rounds,
    }
}
