use thiserror::Error;

use crate::catalog::StepId;

/// Errors from catalog loading and registry lookups.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("step {0} template not found")]
    UnknownStep(StepId),

    #[error("role '{role}' does not take part in step {step_id}")]
    UnknownRole { step_id: StepId, role: String },

    /// YAML/JSON parse failure.
    #[error("parse error: {0}")]
    ParseError(String),

    /// Structural validation failure.
    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("duplicate step ID: {0}")]
    DuplicateStep(StepId),

    #[error("step {step_id} depends on unknown step {dependency}")]
    UnknownDependency { step_id: StepId, dependency: StepId },

    #[error("step {0} depends on itself")]
    SelfDependency(StepId),

    #[error("step {step_id} depends on later step {dependency}")]
    ForwardDependency { step_id: StepId, dependency: StepId },

    #[error("cycle detected involving step {0}")]
    CycleDetected(StepId),
}
