//! Catalog loading from disk.
//!
//! Selects between the built-in catalog and a replacement file named in
//! `config.toml`, reading files through `tokio::fs`.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context;
use devflow_core::catalog::WorkflowTemplateRegistry;
use devflow_core::catalog::definition::{decode_catalog_str, parse_catalog_str};
use devflow_types::catalog::CatalogDocument;
use devflow_types::config::{DependencyOrdering, GlobalConfig};

use crate::filesystem::resolve_catalog_path;

/// Where the active catalog came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Builtin,
    File(PathBuf),
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogSource::Builtin => f.write_str("built-in"),
            CatalogSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

async fn read_catalog_text(path: &Path) -> anyhow::Result<String> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read catalog file {}", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "catalog file read");
    Ok(content)
}

/// Read and validate a catalog file (`.json` or YAML).
pub async fn load_catalog_document(
    path: &Path,
    ordering: DependencyOrdering,
) -> anyhow::Result<CatalogDocument> {
    let content = read_catalog_text(path).await?;
    let doc = parse_catalog_str(path, &content, ordering)
        .with_context(|| format!("Invalid catalog file {}", path.display()))?;
    Ok(doc)
}

/// Build the registry selected by configuration.
///
/// A configured path that cannot be read or fails validation is an error;
/// there is no silent fallback to the built-in catalog.
pub async fn load_registry(
    config: &GlobalConfig,
    data_dir: &Path,
) -> anyhow::Result<(WorkflowTemplateRegistry, CatalogSource)> {
    let Some(configured) = &config.catalog.path else {
        return Ok((WorkflowTemplateRegistry::new(), CatalogSource::Builtin));
    };

    let path = resolve_catalog_path(data_dir, configured);
    let ordering = config.catalog.dependency_ordering;
    let content = read_catalog_text(&path).await?;
    // `from_catalog` validates
    let doc = decode_catalog_str(&path, &content)
        .with_context(|| format!("Invalid catalog file {}", path.display()))?;
    let registry = WorkflowTemplateRegistry::from_catalog(doc, ordering)
        .with_context(|| format!("Invalid catalog file {}", path.display()))?;
    Ok((registry, CatalogSource::File(path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use devflow_core::catalog::definition::{builtin_catalog, serialize_catalog_json};
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_registry_defaults_to_builtin() {
        let tmp = TempDir::new().unwrap();
        let (registry, source) = load_registry(&GlobalConfig::default(), tmp.path())
            .await
            .unwrap();
        assert_eq!(source, CatalogSource::Builtin);
        assert_eq!(registry.len(), 11);
    }

    #[tokio::test]
    async fn load_registry_from_relative_path() {
        let tmp = TempDir::new().unwrap();
        let mut doc = builtin_catalog().unwrap();
        doc.name = "trimmed".to_string();
        doc.steps.truncate(3);
        tokio::fs::create_dir_all(tmp.path().join("catalogs")).await.unwrap();
        tokio::fs::write(
            tmp.path().join("catalogs/trimmed.json"),
            serialize_catalog_json(&doc).unwrap(),
        )
        .await
        .unwrap();

        let mut config = GlobalConfig::default();
        config.catalog.path = Some(PathBuf::from("catalogs/trimmed.json"));

        let (registry, source) = load_registry(&config, tmp.path()).await.unwrap();
        assert_eq!(registry.name(), "trimmed");
        assert_eq!(registry.len(), 3);
        assert_eq!(
            source,
            CatalogSource::File(tmp.path().join("catalogs/trimmed.json"))
        );
    }

    #[tokio::test]
    async fn load_registry_missing_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let mut config = GlobalConfig::default();
        config.catalog.path = Some(PathBuf::from("nope.yaml"));

        let err = load_registry(&config, tmp.path()).await.unwrap_err();
        assert!(err.to_string().contains("Failed to read catalog file"), "got: {err}");
    }

    #[tokio::test]
    async fn load_catalog_document_reports_validation_errors() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.yaml");
        tokio::fs::write(&path, "name: bad\nversion: '1'\nsteps: []\n")
            .await
            .unwrap();

        let err = load_catalog_document(&path, DependencyOrdering::Ascending)
            .await
            .unwrap_err();
        let chain = format!("{err:#}");
        assert!(chain.contains("at least one step"), "got: {chain}");
    }

    #[tokio::test]
    async fn load_registry_rejects_invalid_file() {
        let tmp = TempDir::new().unwrap();
        let mut doc = builtin_catalog().unwrap();
        doc.steps[3].dependencies = vec![3, 5];
        tokio::fs::write(
            tmp.path().join("forward.json"),
            serialize_catalog_json(&doc).unwrap(),
        )
        .await
        .unwrap();

        let mut config = GlobalConfig::default();
        config.catalog.path = Some(PathBuf::from("forward.json"));

        let err = load_registry(&config, tmp.path()).await.unwrap_err();
        let chain = format!("{err:#}");
        assert!(chain.starts_with("Invalid catalog file"), "got: {chain}");
        assert!(chain.contains("step 4 depends on later step 5"), "got: {chain}");

        // The same file passes once the ordering rule is relaxed.
        config.catalog.dependency_ordering = DependencyOrdering::Any;
        let (registry, _) = load_registry(&config, tmp.path()).await.unwrap();
        assert_eq!(registry.get_template(4).unwrap().dependencies, vec![3, 5]);
    }

    #[tokio::test]
    async fn load_catalog_document_reports_decode_errors() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let err = load_catalog_document(&path, DependencyOrdering::Any)
            .await
            .unwrap_err();
        let chain = format!("{err:#}");
        assert!(chain.contains("parse error"), "got: {chain}");
    }

    #[test]
    fn catalog_source_display() {
        assert_eq!(CatalogSource::Builtin.to_string(), "built-in");
        assert_eq!(
            CatalogSource::File(PathBuf::from("/tmp/steps.yaml")).to_string(),
            "/tmp/steps.yaml"
        );
    }
}
