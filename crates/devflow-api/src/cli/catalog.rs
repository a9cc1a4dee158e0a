//! Catalog-level commands: export, validate, status.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use devflow_core::catalog::definition::{serialize_catalog_json, serialize_catalog_yaml};
use devflow_infra::catalog::load_catalog_document;
use devflow_infra::config::resolve_consensus_config;
use devflow_infra::filesystem::config_path;

use super::ExportFormat;
use crate::state::AppState;

/// Serialize the active catalog in the requested format.
pub fn render_catalog(state: &AppState, format: ExportFormat) -> Result<String> {
    let doc = state.registry.to_document();
    let rendered = match format {
        ExportFormat::Yaml => serialize_catalog_yaml(&doc)?,
        ExportFormat::Json => serialize_catalog_json(&doc)?,
    };
    Ok(rendered)
}

pub async fn export_catalog(
    state: &AppState,
    format: ExportFormat,
    output: Option<&Path>,
    quiet: bool,
) -> Result<()> {
    let rendered = render_catalog(state, format)?;

    let Some(path) = output else {
        print!("{rendered}");
        if !rendered.ends_with('\n') {
            println!();
        }
        return Ok(());
    };

    tokio::fs::write(path, rendered)
        .await
        .with_context(|| format!("Failed to write catalog to {}", path.display()))?;

    if !quiet {
        println!(
            "  {} Exported {} steps to {}",
            style("✓").green().bold(),
            state.registry.len(),
            style(path.display()).cyan()
        );
    }

    Ok(())
}

/// Validate a catalog file with the configured dependency ordering.
///
/// With `quiet`, success prints nothing; failures surface as errors.
pub async fn validate_catalog_file(
    state: &AppState,
    file: &Path,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let ordering = state.config.catalog.dependency_ordering;
    let doc = load_catalog_document(file, ordering).await?;

    if json {
        let out = serde_json::json!({
            "valid": true,
            "path": file.display().to_string(),
            "name": doc.name,
            "version": doc.version,
            "steps": doc.steps.len(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if quiet {
        return Ok(());
    }

    println!();
    println!(
        "  {} {} is a valid catalog",
        style("✓").green().bold(),
        style(file.display()).cyan()
    );
    println!("  Name:    {} v{}", doc.name, doc.version);
    println!("  Steps:   {}", doc.steps.len());
    println!("  Ordering: {ordering}");
    println!();

    Ok(())
}

/// Display catalog and configuration status.
pub fn status(state: &AppState, json: bool, quiet: bool) -> Result<()> {
    let registry = &state.registry;
    let consensus = resolve_consensus_config(&state.config);
    let ordering = state.config.catalog.dependency_ordering;
    let config_file = config_path(&state.data_dir);
    let config_exists = config_file.is_file();

    if json {
        let status = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.data_dir.display().to_string(),
            "config_file": config_file.display().to_string(),
            "config_exists": config_exists,
            "catalog": {
                "name": registry.name(),
                "version": registry.version(),
                "source": state.catalog_source.to_string(),
                "steps": registry.len(),
                "dependency_ordering": ordering.to_string(),
            },
            "consensus": {
                "min_rounds": consensus.min_rounds,
                "max_rounds": consensus.max_rounds,
            },
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    if quiet {
        println!(
            "{} {} {} {}",
            registry.name(),
            registry.version(),
            registry.len(),
            state.catalog_source
        );
        return Ok(());
    }

    println!();
    println!(
        "  {} devflow v{}",
        style("*").green().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!();

    println!("  {}", style("── Catalog ──").dim());
    println!("  Name:     {}", style(registry.name()).cyan());
    println!("  Version:  {}", registry.version());
    println!("  Steps:    {}", style(registry.len()).bold());
    println!("  Source:   {}", state.catalog_source);
    println!("  Ordering: {ordering}");
    println!();

    println!("  {}", style("── Consensus ──").dim());
    println!("  Min rounds: {}", consensus.min_rounds);
    println!("  Max rounds: {}", consensus.max_rounds);
    println!();

    println!("  {}", style("── System ──").dim());
    println!("  Data dir: {}", style(state.data_dir.display()).dim());
    let config_note = if config_exists { "" } else { " (not found, using defaults)" };
    println!(
        "  Config:   {}{}",
        style(config_file.display()).dim(),
        style(config_note).yellow()
    );
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use devflow_core::catalog::WorkflowTemplateRegistry;
    use devflow_core::catalog::definition::{parse_catalog_json, parse_catalog_yaml};
    use devflow_types::config::DependencyOrdering;
    use tempfile::TempDir;

    #[test]
    fn test_render_catalog_is_reloadable() {
        let state = AppState::builtin();

        let yaml = render_catalog(&state, ExportFormat::Yaml).unwrap();
        let doc = parse_catalog_yaml(&yaml, DependencyOrdering::Ascending).unwrap();
        let reloaded = WorkflowTemplateRegistry::from_catalog(doc, DependencyOrdering::Ascending)
            .unwrap();
        assert_eq!(&reloaded, state.registry.as_ref());

        let json = render_catalog(&state, ExportFormat::Json).unwrap();
        let doc = parse_catalog_json(&json, DependencyOrdering::Ascending).unwrap();
        assert_eq!(doc.steps.len(), 11);
    }

    #[tokio::test]
    async fn test_export_then_validate_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("catalog.json");
        let state = AppState::builtin();

        export_catalog(&state, ExportFormat::Json, Some(&path), true)
            .await
            .unwrap();
        assert!(path.exists());
        validate_catalog_file(&state, &path, false, true).await.unwrap();
    }

    #[tokio::test]
    async fn test_validate_rejects_broken_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.yaml");
        tokio::fs::write(&path, "name: broken\nversion: \"1\"\nsteps: []\n")
            .await
            .unwrap();

        let err = validate_catalog_file(&AppState::builtin(), &path, true, false)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid catalog file"));
    }
}
