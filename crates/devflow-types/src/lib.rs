//! Shared domain types for devflow.
//!
//! Step templates and their records (roles, topics, completion criteria,
//! output fields), consensus tracking records, global configuration, and the
//! catalog error type.
//!
//! No infrastructure dependencies -- only serde and thiserror.

pub mod catalog;
pub mod config;
pub mod consensus;
pub mod error;
