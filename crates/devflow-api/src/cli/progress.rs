//! Progress commands: check, next, plan.
//!
//! Completed steps are passed on the command line; devflow keeps no
//! progress state of its own.

use anyhow::Result;
use console::style;

use devflow_types::catalog::StepId;

use super::{format_ids, resolve_template, step_line};
use crate::state::AppState;

/// Bare `--quiet` form of a dependency check.
pub fn check_line(missing: &[StepId]) -> String {
    if missing.is_empty() {
        "ready".to_string()
    } else {
        format!("blocked: {}", format_ids(missing))
    }
}

/// Bare `--quiet` form of the execution plan: one wave per line.
pub fn plan_lines(waves: &[Vec<StepId>]) -> Vec<String> {
    waves
        .iter()
        .map(|wave| {
            wave.iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

pub fn check_step(
    state: &AppState,
    raw_step: i64,
    completed: &[StepId],
    json: bool,
    quiet: bool,
) -> Result<()> {
    let template = resolve_template(&state.registry, raw_step)?;
    let ready = state
        .registry
        .validate_dependencies(template.step_id, completed)?;
    let missing = state
        .registry
        .missing_dependencies(template.step_id, completed)?;

    tracing::debug!(step_id = template.step_id, ready, ?missing, "dependency check");

    if json {
        let out = serde_json::json!({
            "step_id": template.step_id,
            "ready": ready,
            "missing": missing,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if quiet {
        println!("{}", check_line(&missing));
        return Ok(());
    }

    println!();
    if ready {
        println!(
            "  {} Step {} ({}) is ready to start",
            style("✓").green().bold(),
            template.step_id,
            style(&template.name).cyan()
        );
    } else {
        println!(
            "  {} Step {} ({}) is blocked",
            style("✗").red().bold(),
            template.step_id,
            style(&template.name).cyan()
        );
        println!("  Waiting on: {}", format_ids(&missing));
    }
    println!();

    Ok(())
}

pub fn next_steps(state: &AppState, completed: &[StepId], json: bool, quiet: bool) -> Result<()> {
    let ready = state.registry.ready_steps(completed);

    if json {
        let out: Vec<_> = ready
            .iter()
            .map(|t| serde_json::json!({ "step_id": t.step_id, "name": t.name }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if quiet {
        for t in &ready {
            println!("{}", step_line(t));
        }
        return Ok(());
    }

    println!();
    if ready.is_empty() {
        println!("  {}", style("No steps left to start.").dim());
    } else {
        println!("  {} Ready to start:", style("*").green().bold());
        for t in &ready {
            println!("  {} {}", style(format!("{:>3}", t.step_id)).bold(), t.name);
        }
    }
    println!();

    Ok(())
}

pub fn show_plan(state: &AppState, json: bool, quiet: bool) -> Result<()> {
    let waves = state.registry.execution_plan()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&waves)?);
        return Ok(());
    }

    if quiet {
        for line in plan_lines(&waves) {
            println!("{line}");
        }
        return Ok(());
    }

    println!();
    println!(
        "  {} Execution plan for {} ({} waves)",
        style("*").green().bold(),
        style(state.registry.name()).cyan(),
        waves.len()
    );
    println!();
    for (i, wave) in waves.iter().enumerate() {
        println!("  {}", style(format!("Wave {}", i + 1)).bold());
        for step_id in wave {
            let template = state.registry.get_template(*step_id)?;
            println!("    {:>3} {}", step_id, template.name);
        }
    }
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_line() {
        assert_eq!(check_line(&[]), "ready");
        assert_eq!(check_line(&[4, 5]), "blocked: 4, 5");
    }

    #[test]
    fn test_plan_lines_for_builtin_catalog() {
        let state = AppState::builtin();
        let waves = state.registry.execution_plan().unwrap();
        let lines = plan_lines(&waves);
        assert_eq!(lines[0], "1");
        assert_eq!(lines[3], "4 5");
        assert_eq!(lines.last().map(String::as_str), Some("11"));
    }
}
