//! Read-only registry of step templates, keyed by step ID.
//!
//! Built once from a validated `CatalogDocument` and never mutated afterwards.
//! Only `&self` accessors exist, so a registry can be shared across threads
//! behind an `Arc` without locking.

use std::collections::{BTreeMap, HashSet};

use devflow_types::catalog::{CatalogDocument, StepId, StepTemplate};
use devflow_types::config::DependencyOrdering;
use devflow_types::error::CatalogError;

use super::dag::{build_execution_plan, get_step_dependencies};
use super::definition::{builtin_catalog, validate_catalog};

/// Lookup table of the workflow's step templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowTemplateRegistry {
    name: String,
    version: String,
    description: Option<String>,
    templates: BTreeMap<StepId, StepTemplate>,
}

impl WorkflowTemplateRegistry {
    /// Build the registry from the built-in eleven-step catalog.
    pub fn new() -> Self {
        let doc = builtin_catalog().expect("built-in step catalog is valid");
        Self::from_validated(doc)
    }

    /// Build a registry from any catalog document, validating it first.
    pub fn from_catalog(
        doc: CatalogDocument,
        ordering: DependencyOrdering,
    ) -> Result<Self, CatalogError> {
        validate_catalog(&doc, ordering)?;
        Ok(Self::from_validated(doc))
    }

    fn from_validated(doc: CatalogDocument) -> Self {
        let templates: BTreeMap<StepId, StepTemplate> = doc
            .steps
            .into_iter()
            .map(|step| (step.step_id, step))
            .collect();
        tracing::debug!(
            catalog = %doc.name,
            version = %doc.version,
            steps = templates.len(),
            "step registry built"
        );
        Self {
            name: doc.name,
            version: doc.version,
            description: doc.description,
            templates,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Get the template for a step.
    pub fn get_template(&self, step_id: StepId) -> Result<&StepTemplate, CatalogError> {
        self.templates
            .get(&step_id)
            .ok_or(CatalogError::UnknownStep(step_id))
    }

    /// All templates, ascending by step ID.
    pub fn get_all_templates(&self) -> &BTreeMap<StepId, StepTemplate> {
        &self.templates
    }

    /// Whether every dependency of `step_id` appears in `completed_steps`.
    ///
    /// Only membership matters; order and duplicates in `completed_steps` are
    /// ignored. A step without dependencies is always ready.
    pub fn validate_dependencies(
        &self,
        step_id: StepId,
        completed_steps: &[StepId],
    ) -> Result<bool, CatalogError> {
        Ok(self
            .missing_dependencies(step_id, completed_steps)?
            .is_empty())
    }

    /// Dependencies of `step_id` not yet in `completed_steps`, in declaration order.
    pub fn missing_dependencies(
        &self,
        step_id: StepId,
        completed_steps: &[StepId],
    ) -> Result<Vec<StepId>, CatalogError> {
        let template = self.get_template(step_id)?;
        let completed: HashSet<StepId> = completed_steps.iter().copied().collect();
        Ok(template
            .dependencies
            .iter()
            .copied()
            .filter(|dep| !completed.contains(dep))
            .collect())
    }

    /// Steps that are not completed yet but whose dependencies all are.
    pub fn ready_steps(&self, completed_steps: &[StepId]) -> Vec<&StepTemplate> {
        let completed: HashSet<StepId> = completed_steps.iter().copied().collect();
        self.templates
            .values()
            .filter(|t| !completed.contains(&t.step_id))
            .filter(|t| t.dependencies.iter().all(|dep| completed.contains(dep)))
            .collect()
    }

    /// Every step that must finish before `step_id` can start, ascending.
    pub fn transitive_dependencies(&self, step_id: StepId) -> Result<Vec<StepId>, CatalogError> {
        self.get_template(step_id)?;
        let steps: Vec<StepTemplate> = self.templates.values().cloned().collect();
        Ok(get_step_dependencies(step_id, &steps))
    }

    /// Steps grouped into waves; each wave only depends on earlier waves.
    pub fn execution_plan(&self) -> Result<Vec<Vec<StepId>>, CatalogError> {
        let steps: Vec<StepTemplate> = self.templates.values().cloned().collect();
        build_execution_plan(&steps)
    }

    /// The catalog backing this registry, steps ascending by ID.
    pub fn to_document(&self) -> CatalogDocument {
        CatalogDocument {
            name: self.name.clone(),
            version: self.version.clone(),
            description: self.description.clone(),
            steps: self.templates.values().cloned().collect(),
        }
    }
}

impl Default for WorkflowTemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
