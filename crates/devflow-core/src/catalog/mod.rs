//! Step catalog core: definition parsing, DAG analysis, and the registry.
//!
//! - `definition` -- YAML/JSON parsing, validation, built-in catalog, file load/save
//! - `dag` -- dependency graph, cycle detection, wave computation
//! - `registry` -- read-only lookup of step templates by ID

pub mod dag;
pub mod definition;
pub mod registry;

pub use registry::WorkflowTemplateRegistry;
