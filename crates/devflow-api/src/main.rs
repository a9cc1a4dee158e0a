//! devflow CLI entry point.
//!
//! Binary name: `devflow`
//!
//! Parses CLI arguments, loads configuration and the step catalog, then
//! dispatches to the appropriate command handler.

mod cli;
mod state;

use anyhow::anyhow;
use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,devflow_core=debug,devflow_infra=debug,devflow_api=debug",
        _ => "trace",
    };

    devflow_observe::tracing_setup::init_tracing(filter, cli.otel)
        .map_err(|e| anyhow!("failed to initialize tracing: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "devflow", &mut std::io::stdout());
        return Ok(());
    }

    // Flush spans whether or not the command (or state init) failed
    let result = run(&cli).await;
    devflow_observe::tracing_setup::shutdown_tracing();
    result
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let state = AppState::init().await?;
    let state = &state;
    let (json, quiet) = (cli.json, cli.quiet);

    match &cli.command {
        Commands::List => cli::step::list_steps(state, json, quiet)?,

        Commands::Show { step } => cli::step::show_step(state, *step, json, quiet)?,

        Commands::Deps { step, transitive } => {
            cli::step::show_dependencies(state, *step, *transitive, json, quiet)?;
        }

        Commands::Check { step, completed } => {
            cli::progress::check_step(state, *step, completed, json, quiet)?;
        }

        Commands::Next { completed } => cli::progress::next_steps(state, completed, json, quiet)?,

        Commands::Plan => cli::progress::show_plan(state, json, quiet)?,

        Commands::Export { format, output } => {
            cli::catalog::export_catalog(state, *format, output.as_deref(), quiet).await?;
        }

        Commands::Validate { file } => {
            cli::catalog::validate_catalog_file(state, file, json, quiet).await?;
        }

        Commands::Consensus { step, rounds } => {
            cli::consensus::run_consensus(state, *step, rounds, json, quiet)?;
        }

        Commands::Status => cli::catalog::status(state, json, quiet)?,

        Commands::Completions { .. } => unreachable!("handled before state init"),
    }

    Ok(())
}
