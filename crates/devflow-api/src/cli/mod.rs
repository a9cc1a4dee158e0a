//! CLI command definitions for the `devflow` binary.
//!
//! Uses clap derive macros for argument parsing. Commands query the active
//! step catalog; nothing here mutates it.

pub mod catalog;
pub mod consensus;
pub mod progress;
pub mod step;

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use devflow_core::catalog::WorkflowTemplateRegistry;
use devflow_types::catalog::{StepId, StepTemplate};

/// Browse the step templates of the delivery workflow.
#[derive(Parser)]
#[command(name = "devflow", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Print bare, unstyled results and log errors only.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans to stdout via OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List every step in the active catalog.
    #[command(alias = "ls")]
    List,

    /// Show the full template for a step.
    Show {
        /// Step ID.
        #[arg(allow_negative_numbers = true)]
        step: i64,
    },

    /// Check whether a step's dependencies are completed.
    Check {
        /// Step ID.
        #[arg(allow_negative_numbers = true)]
        step: i64,

        /// Completed step IDs (comma-separated).
        #[arg(long, value_delimiter = ',')]
        completed: Vec<StepId>,
    },

    /// List the steps that can start now.
    Next {
        /// Completed step IDs (comma-separated).
        #[arg(long, value_delimiter = ',')]
        completed: Vec<StepId>,
    },

    /// Show the steps grouped into dependency waves.
    Plan,

    /// Show a step's dependencies.
    Deps {
        /// Step ID.
        #[arg(allow_negative_numbers = true)]
        step: i64,

        /// Include indirect dependencies.
        #[arg(long)]
        transitive: bool,
    },

    /// Write the active catalog as YAML or JSON.
    Export {
        /// Output format.
        #[arg(long, value_enum, default_value_t = ExportFormat::Yaml)]
        format: ExportFormat,

        /// Output file (stdout when omitted).
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Validate a catalog file without activating it.
    Validate {
        /// Path to a `.yaml`, `.yml`, or `.json` catalog.
        file: PathBuf,
    },

    /// Tally role agreement over dialogue rounds for a step.
    Consensus {
        /// Step ID.
        #[arg(allow_negative_numbers = true)]
        step: i64,

        /// One dialogue round as `Role=status,...` (repeatable, in order).
        /// Statuses: agree, disagree, conditional, pending.
        #[arg(long = "round", value_name = "BALLOT")]
        rounds: Vec<String>,
    },

    /// Show catalog and configuration status.
    Status,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Serialization format for `export`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Yaml,
    Json,
}

/// Resolve a raw step argument against the registry.
///
/// Negative or out-of-range values produce the same "not found" message as
/// unregistered IDs.
pub fn resolve_template(registry: &WorkflowTemplateRegistry, raw: i64) -> Result<&StepTemplate> {
    let step_id =
        StepId::try_from(raw).map_err(|_| anyhow!("step {raw} template not found"))?;
    Ok(registry.get_template(step_id)?)
}

/// `id<TAB>name`, the bare form of a step used by `--quiet` output.
pub fn step_line(template: &StepTemplate) -> String {
    format!("{}\t{}", template.step_id, template.name)
}

/// Render a list of step IDs as `1, 2, 3` (or `—` when empty).
pub fn format_ids(ids: &[StepId]) -> String {
    if ids.is_empty() {
        return "—".to_string();
    }
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_negative_step() {
        let cli = Cli::try_parse_from(["devflow", "show", "-1"]).unwrap();
        assert!(matches!(cli.command, Commands::Show { step: -1 }));
    }

    #[test]
    fn test_parse_completed_list() {
        let cli = Cli::try_parse_from(["devflow", "check", "3", "--completed", "1,2"]).unwrap();
        match cli.command {
            Commands::Check { step, completed } => {
                assert_eq!(step, 3);
                assert_eq!(completed, vec![1, 2]);
            }
            _ => panic!("expected check command"),
        }
    }

    #[test]
    fn test_resolve_template() {
        let registry = WorkflowTemplateRegistry::new();
        assert_eq!(resolve_template(&registry, 7).unwrap().step_id, 7);

        for raw in [-1, 0, 12] {
            let err = resolve_template(&registry, raw).unwrap_err();
            assert_eq!(err.to_string(), format!("step {raw} template not found"));
        }
    }

    #[test]
    fn test_parse_global_quiet_after_subcommand() {
        let cli = Cli::try_parse_from(["devflow", "plan", "--quiet"]).unwrap();
        assert!(cli.quiet);
        assert!(!cli.json);
    }

    #[test]
    fn test_step_line() {
        let registry = WorkflowTemplateRegistry::new();
        let template = registry.get_template(1).unwrap();
        assert_eq!(step_line(template), "1\tProject Definition");
    }

    #[test]
    fn test_format_ids() {
        assert_eq!(format_ids(&[]), "—");
        assert_eq!(format_ids(&[1, 2, 3]), "1, 2, 3");
    }
}
