//! Global configuration types for devflow.
//!
//! `GlobalConfig` represents the top-level `config.toml` that selects the
//! active step catalog and tunes consensus tracking.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
///
/// Loaded from `~/.devflow/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub consensus: ConsensusConfig,
}

/// Which catalog to load and how strictly to check it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Replacement catalog file. Relative paths resolve against the data
    /// directory. `None` selects the built-in catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    #[serde(default)]
    pub dependency_ordering: DependencyOrdering,
}

/// Constraint on the numeric order of dependency edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyOrdering {
    /// Every dependency must have a smaller step ID than its dependent.
    #[default]
    Ascending,
    /// Any order is accepted as long as the graph stays acyclic.
    Any,
}

impl DependencyOrdering {
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyOrdering::Ascending => "ascending",
            DependencyOrdering::Any => "any",
        }
    }
}

impl std::fmt::Display for DependencyOrdering {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Round limits for consensus tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusConfig {
    /// Rounds required before consensus can be declared.
    #[serde(default = "default_min_rounds")]
    pub min_rounds: u32,

    /// Rounds after which the discussion is considered stuck.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
}

fn default_min_rounds() -> u32 {
    2
}

fn default_max_rounds() -> u32 {
    5
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            min_rounds: default_min_rounds(),
            max_rounds: default_max_rounds(),
        }
    }
}
