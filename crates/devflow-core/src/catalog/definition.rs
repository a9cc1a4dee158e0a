//! Catalog parsing and validation.
//!
//! Converts between YAML/JSON text and `CatalogDocument`, validates
//! structural constraints (unique IDs, known dependencies, ordering, no
//! cycles), and exposes the built-in eleven-step catalog. Reading files is
//! left to `devflow-infra`.

use std::collections::HashSet;
use std::path::Path;

use devflow_types::catalog::CatalogDocument;
use devflow_types::config::DependencyOrdering;
use devflow_types::error::CatalogError;

use super::dag::validate_dag;

/// The built-in delivery workflow catalog.
const BUILTIN_CATALOG_YAML: &str = include_str!("../../catalog/steps.yaml");

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a YAML string into a validated `CatalogDocument`.
pub fn parse_catalog_yaml(
    yaml: &str,
    ordering: DependencyOrdering,
) -> Result<CatalogDocument, CatalogError> {
    let doc = decode_catalog_yaml(yaml)?;
    validate_catalog(&doc, ordering)?;
    Ok(doc)
}

/// Parse a JSON string into a validated `CatalogDocument`.
pub fn parse_catalog_json(
    json: &str,
    ordering: DependencyOrdering,
) -> Result<CatalogDocument, CatalogError> {
    let doc = decode_catalog_json(json)?;
    validate_catalog(&doc, ordering)?;
    Ok(doc)
}

fn decode_catalog_yaml(yaml: &str) -> Result<CatalogDocument, CatalogError> {
    serde_yaml_ng::from_str(yaml).map_err(|e| CatalogError::ParseError(e.to_string()))
}

fn decode_catalog_json(json: &str) -> Result<CatalogDocument, CatalogError> {
    serde_json::from_str(json).map_err(|e| CatalogError::ParseError(e.to_string()))
}

pub fn serialize_catalog_yaml(doc: &CatalogDocument) -> Result<String, CatalogError> {
    serde_yaml_ng::to_string(doc).map_err(|e| CatalogError::ParseError(e.to_string()))
}

pub fn serialize_catalog_json(doc: &CatalogDocument) -> Result<String, CatalogError> {
    serde_json::to_string_pretty(doc).map_err(|e| CatalogError::ParseError(e.to_string()))
}

/// Decode and validate the built-in catalog.
pub fn builtin_catalog() -> Result<CatalogDocument, CatalogError> {
    parse_catalog_yaml(BUILTIN_CATALOG_YAML, DependencyOrdering::Ascending)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate structural constraints on a `CatalogDocument`.
///
/// Checks:
/// - Name is non-empty and contains only alphanumeric characters and hyphens
/// - At least one step exists
/// - Step IDs are positive and unique, step names are non-empty
/// - Every step has roles, topics, completion criteria, and output fields
/// - Role names are unique within a step
/// - Dependencies point to existing steps other than the step itself
/// - With `Ascending` ordering, every dependency has a smaller ID
/// - The dependency graph is acyclic
pub fn validate_catalog(
    doc: &CatalogDocument,
    ordering: DependencyOrdering,
) -> Result<(), CatalogError> {
    if doc.name.is_empty() {
        return Err(CatalogError::ValidationError(
            "catalog name must not be empty".to_string(),
        ));
    }
    if !doc.name.chars().all(|c| c.is_alphanumeric() || c == '-') {
        return Err(CatalogError::ValidationError(format!(
            "catalog name '{}' contains invalid characters (only alphanumeric and hyphens allowed)",
            doc.name
        )));
    }

    if doc.steps.is_empty() {
        return Err(CatalogError::ValidationError(
            "catalog must have at least one step".to_string(),
        ));
    }

    let mut seen_ids = HashSet::new();
    for step in &doc.steps {
        if step.step_id == 0 {
            return Err(CatalogError::ValidationError(
                "step IDs start at 1".to_string(),
            ));
        }
        if !seen_ids.insert(step.step_id) {
            return Err(CatalogError::DuplicateStep(step.step_id));
        }
        if step.name.trim().is_empty() {
            return Err(CatalogError::ValidationError(format!(
                "step {} has an empty name",
                step.step_id
            )));
        }

        let empty_section = if step.roles.is_empty() {
            Some("roles")
        } else if step.topics.is_empty() {
            Some("topics")
        } else if step.completion_criteria.is_empty() {
            Some("completion criteria")
        } else if step.output_structure.is_empty() {
            Some("output fields")
        } else {
            None
        };
        if let Some(section) = empty_section {
            return Err(CatalogError::ValidationError(format!(
                "step {} has no {section}",
                step.step_id
            )));
        }

        let mut seen_roles = HashSet::new();
        for role in &step.roles {
            if !seen_roles.insert(role.name.as_str()) {
                return Err(CatalogError::ValidationError(format!(
                    "step {} lists role '{}' more than once",
                    step.step_id, role.name
                )));
            }
        }
    }

    for step in &doc.steps {
        for &dep in &step.dependencies {
            if dep == step.step_id {
                return Err(CatalogError::SelfDependency(step.step_id));
            }
            if !seen_ids.contains(&dep) {
                return Err(CatalogError::UnknownDependency {
                    step_id: step.step_id,
                    dependency: dep,
                });
            }
            if ordering == DependencyOrdering::Ascending && dep > step.step_id {
                return Err(CatalogError::ForwardDependency {
                    step_id: step.step_id,
                    dependency: dep,
                });
            }
        }
    }

    // Ascending order already rules out cycles; `Any` relies on this.
    validate_dag(&doc.steps)
}

// ---------------------------------------------------------------------------
// File content
// ---------------------------------------------------------------------------

/// Decode catalog text without validating it, choosing JSON or YAML from the
/// file extension.
pub fn decode_catalog_str(path: &Path, content: &str) -> Result<CatalogDocument, CatalogError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => decode_catalog_json(content),
        _ => decode_catalog_yaml(content),
    }
}

/// Decode and validate catalog text, choosing JSON or YAML from the file
/// extension.
pub fn parse_catalog_str(
    path: &Path,
    content: &str,
    ordering: DependencyOrdering,
) -> Result<CatalogDocument, CatalogError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => parse_catalog_json(content, ordering),
        _ => parse_catalog_yaml(content, ordering),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
