//! Business logic for devflow.
//!
//! Depends only on `devflow-types` -- never on `devflow-infra`. Configuration
//! lookup and data-directory handling live in the infra layer.

pub mod catalog;
pub mod consensus;
