//! Step catalog domain types for devflow.
//!
//! A catalog is an ordered set of `StepTemplate`s, one per stage of the
//! delivery workflow. Each template lists the roles consulted during the step,
//! the topics they discuss, the criteria that mark the step complete, and the
//! shape of the document the step produces. `CatalogDocument` is the on-disk
//! (YAML/JSON) form of a whole catalog.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric identifier of a workflow step (1-based).
pub type StepId = u32;

// ---------------------------------------------------------------------------
// Enumerated labels
// ---------------------------------------------------------------------------

/// Urgency of a discussion topic.
///
/// Variants are declared most urgent first, so the derived `Ord` sorts
/// `Critical` before `Low`. The ordering is advisory: nothing rejects a
/// template whose topics are listed out of order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a role takes part in a step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipationLevel {
    #[default]
    Primary,
    Secondary,
    /// Only consulted when the step's subject matter calls for it
    /// (e.g. an AI specialist when AI features are in scope).
    Conditional,
}

impl ParticipationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipationLevel::Primary => "primary",
            ParticipationLevel::Secondary => "secondary",
            ParticipationLevel::Conditional => "conditional",
        }
    }
}

impl fmt::Display for ParticipationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Informal type tag for an output field. Not enforced against any schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    #[default]
    String,
    Object,
    Array,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Object => "object",
            DataType::Array => "array",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Template records
// ---------------------------------------------------------------------------

/// A reviewer/contributor persona consulted during a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    /// What the role pays attention to.
    pub focus: String,
    /// What the role signs off on.
    pub validates: String,
    /// What the role pushes back on.
    pub challenges: String,
    #[serde(default)]
    pub participation_level: ParticipationLevel,
}

impl Role {
    /// Create a primary role.
    pub fn new(
        name: impl Into<String>,
        focus: impl Into<String>,
        validates: impl Into<String>,
        challenges: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            focus: focus.into(),
            validates: validates.into(),
            challenges: challenges.into(),
            participation_level: ParticipationLevel::Primary,
        }
    }

    pub fn with_participation(mut self, level: ParticipationLevel) -> Self {
        self.participation_level = level;
        self
    }
}

/// A discussion item with an associated urgency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub priority: Priority,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl Topic {
    pub fn new(priority: Priority, description: impl Into<String>) -> Self {
        Self {
            priority,
            description: description.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// A condition that must hold before a step counts as done.
///
/// `validation_method` names an external check (e.g. `"consensus_check"`);
/// the catalog only carries the label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionCriterion {
    pub description: String,
    pub validation_method: String,
    #[serde(default = "default_true")]
    pub required: bool,
}

impl CompletionCriterion {
    /// Create a required criterion.
    pub fn new(description: impl Into<String>, validation_method: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            validation_method: validation_method.into(),
            required: true,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// One named, typed element of a step's output document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputField {
    pub name: String,
    pub description: String,
    #[serde(default = "default_true")]
    pub required: bool,
    #[serde(default)]
    pub data_type: DataType,
}

impl OutputField {
    /// Create a required field.
    pub fn new(name: impl Into<String>, description: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required: true,
            data_type,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

// ---------------------------------------------------------------------------
// Step template
// ---------------------------------------------------------------------------

/// One stage of the workflow and everything needed to run it.
///
/// Templates only grow: the `add_*` methods append and there is no removal.
/// Once a template is handed to a registry it is treated as read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepTemplate {
    pub step_id: StepId,
    pub name: String,
    /// Step IDs that must be completed before this one may begin (DAG edges).
    #[serde(default)]
    pub dependencies: Vec<StepId>,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub topics: Vec<Topic>,
    #[serde(default)]
    pub completion_criteria: Vec<CompletionCriterion>,
    #[serde(default)]
    pub output_structure: Vec<OutputField>,
}

impl StepTemplate {
    pub fn new(step_id: StepId, name: impl Into<String>, dependencies: Vec<StepId>) -> Self {
        Self {
            step_id,
            name: name.into(),
            dependencies,
            roles: Vec::new(),
            topics: Vec::new(),
            completion_criteria: Vec::new(),
            output_structure: Vec::new(),
        }
    }

    pub fn add_role(&mut self, role: Role) {
        self.roles.push(role);
    }

    pub fn add_topic(&mut self, topic: Topic) {
        self.topics.push(topic);
    }

    pub fn add_completion_criterion(&mut self, criterion: CompletionCriterion) {
        self.completion_criteria.push(criterion);
    }

    pub fn add_output_field(&mut self, field: OutputField) {
        self.output_structure.push(field);
    }

    /// Topics sorted most urgent first. Equal priorities keep insertion order.
    pub fn topics_by_priority(&self) -> Vec<&Topic> {
        let mut topics: Vec<&Topic> = self.topics.iter().collect();
        topics.sort_by_key(|t| t.priority);
        topics
    }

    pub fn roles_with_level(&self, level: ParticipationLevel) -> impl Iterator<Item = &Role> {
        self.roles
            .iter()
            .filter(move |r| r.participation_level == level)
    }

    pub fn required_outputs(&self) -> impl Iterator<Item = &OutputField> {
        self.output_structure.iter().filter(|f| f.required)
    }
}

// ---------------------------------------------------------------------------
// Catalog document
// ---------------------------------------------------------------------------

/// A whole catalog as stored in YAML or JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDocument {
    /// Catalog name (alphanumeric and hyphens).
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub steps: Vec<StepTemplate>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
