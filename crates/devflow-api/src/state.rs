//! Application state shared by all CLI commands.
//!
//! Resolves the data directory, reads `config.toml`, and builds the step
//! registry from the configured catalog.

use std::path::PathBuf;
use std::sync::Arc;

use devflow_core::catalog::WorkflowTemplateRegistry;
use devflow_infra::catalog::{CatalogSource, load_registry};
use devflow_infra::config::load_global_config;
use devflow_infra::filesystem::resolve_data_dir;
use devflow_types::config::GlobalConfig;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<WorkflowTemplateRegistry>,
    pub config: GlobalConfig,
    pub catalog_source: CatalogSource,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize state: load config, then the catalog it selects.
    ///
    /// The data directory is not created; a missing directory just means
    /// defaults and the built-in catalog.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        let config = load_global_config(&data_dir).await;
        let (registry, catalog_source) = load_registry(&config, &data_dir).await?;

        tracing::info!(
            catalog = %catalog_source,
            steps = registry.len(),
            data_dir = %data_dir.display(),
            "step registry ready"
        );

        Ok(Self {
            registry: Arc::new(registry),
            config,
            catalog_source,
            data_dir,
        })
    }

    /// State over the built-in catalog with default configuration.
    #[cfg(test)]
    pub fn builtin() -> Self {
        Self {
            registry: Arc::new(WorkflowTemplateRegistry::new()),
            config: GlobalConfig::default(),
            catalog_source: CatalogSource::Builtin,
            data_dir: PathBuf::from(".devflow"),
        }
    }
}
