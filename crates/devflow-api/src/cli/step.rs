//! Step browsing commands: list, show, deps.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use devflow_types::catalog::{ParticipationLevel, Priority, StepTemplate};

use super::{format_ids, resolve_template, step_line};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

pub fn list_steps(state: &AppState, json: bool, quiet: bool) -> Result<()> {
    let templates = state.registry.get_all_templates();

    if json {
        let out: Vec<_> = templates
            .values()
            .map(|t| {
                serde_json::json!({
                    "step_id": t.step_id,
                    "name": t.name,
                    "dependencies": t.dependencies,
                    "roles": t.roles.len(),
                    "topics": t.topics.len(),
                    "completion_criteria": t.completion_criteria.len(),
                    "output_fields": t.output_structure.len(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if quiet {
        for t in templates.values() {
            println!("{}", step_line(t));
        }
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("#").fg(Color::White),
        Cell::new("Step").fg(Color::White),
        Cell::new("Depends on").fg(Color::White),
        Cell::new("Roles").fg(Color::White),
        Cell::new("Topics").fg(Color::White),
        Cell::new("Criteria").fg(Color::White),
        Cell::new("Outputs").fg(Color::White),
    ]);

    for t in templates.values() {
        table.add_row(vec![
            Cell::new(t.step_id).fg(Color::Cyan),
            Cell::new(&t.name),
            Cell::new(format_ids(&t.dependencies)).fg(Color::DarkGrey),
            Cell::new(t.roles.len()),
            Cell::new(t.topics.len()),
            Cell::new(t.completion_criteria.len()),
            Cell::new(t.output_structure.len()),
        ]);
    }

    println!();
    println!(
        "  {} {} v{}",
        style("*").green().bold(),
        style(state.registry.name()).cyan(),
        state.registry.version()
    );
    println!();
    println!("{table}");
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// Show
// ---------------------------------------------------------------------------

pub fn show_step(state: &AppState, raw_step: i64, json: bool, quiet: bool) -> Result<()> {
    let template = resolve_template(&state.registry, raw_step)?;

    if json {
        println!("{}", serde_json::to_string_pretty(template)?);
        return Ok(());
    }

    if quiet {
        println!("{}", step_line(template));
        return Ok(());
    }

    print_template(template);
    Ok(())
}

fn priority_style(priority: Priority) -> console::StyledObject<&'static str> {
    let label = priority.as_str();
    match priority {
        Priority::Critical => style(label).red().bold(),
        Priority::High => style(label).yellow(),
        Priority::Medium => style(label).cyan(),
        Priority::Low => style(label).dim(),
    }
}

fn print_template(t: &StepTemplate) {
    println!();
    println!(
        "  {} Step {}: {}",
        style("*").green().bold(),
        t.step_id,
        style(&t.name).cyan().bold()
    );
    println!("  Depends on: {}", format_ids(&t.dependencies));
    println!();

    println!("  {}", style("── Roles ──").dim());
    for role in &t.roles {
        let level = match role.participation_level {
            ParticipationLevel::Primary => String::new(),
            other => format!(" ({other})"),
        };
        println!("  {}{}", style(&role.name).bold(), style(level).yellow());
        println!("      focus:      {}", role.focus);
        println!("      validates:  {}", role.validates);
        println!("      challenges: {}", role.challenges);
    }
    let on_demand: Vec<&str> = t
        .roles_with_level(ParticipationLevel::Conditional)
        .map(|r| r.name.as_str())
        .collect();
    if !on_demand.is_empty() {
        println!("  {} {}", style("Joins when needed:").dim(), on_demand.join(", "));
    }
    println!();

    println!("  {}", style("── Topics ──").dim());
    for topic in t.topics_by_priority() {
        println!("  [{:<8}] {}", priority_style(topic.priority), topic.description);
        if let Some(context) = &topic.context {
            println!("             {}", style(context).dim());
        }
    }
    println!();

    println!("  {}", style("── Completion criteria ──").dim());
    for criterion in &t.completion_criteria {
        let marker = if criterion.required {
            style("✓").green()
        } else {
            style("○").dim()
        };
        println!(
            "  {} {} {}",
            marker,
            criterion.description,
            style(format!("[{}]", criterion.validation_method)).dim()
        );
    }
    println!();

    let required = t.required_outputs().count();
    println!(
        "  {}",
        style(format!("── Output ({required} of {} required) ──", t.output_structure.len())).dim()
    );
    for field in &t.output_structure {
        let required = if field.required { "" } else { " (optional)" };
        println!(
            "  {:<32} {:<7} {}{}",
            style(&field.name).bold(),
            field.data_type,
            field.description,
            style(required).dim()
        );
    }
    println!();
}

// ---------------------------------------------------------------------------
// Deps
// ---------------------------------------------------------------------------

pub fn show_dependencies(
    state: &AppState,
    raw_step: i64,
    transitive: bool,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let template = resolve_template(&state.registry, raw_step)?;
    let deps = if transitive {
        state.registry.transitive_dependencies(template.step_id)?
    } else {
        template.dependencies.clone()
    };

    if json {
        let out = serde_json::json!({
            "step_id": template.step_id,
            "transitive": transitive,
            "dependencies": deps,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if quiet {
        for dep in &deps {
            println!("{dep}");
        }
        return Ok(());
    }

    println!();
    println!(
        "  Step {} ({}) {} on:",
        template.step_id,
        style(&template.name).cyan(),
        if transitive { "transitively depends" } else { "depends" }
    );
    if deps.is_empty() {
        println!("  {}", style("nothing -- can start immediately").dim());
    }
    for dep in &deps {
        let name = state
            .registry
            .get_template(*dep)
            .map(|t| t.name.as_str())
            .unwrap_or("?");
        println!("  {} {}", style(format!("{dep:>3}")).bold(), name);
    }
    println!();

    Ok(())
}
