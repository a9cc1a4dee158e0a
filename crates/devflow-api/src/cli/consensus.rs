//! Consensus tally command.
//!
//! Each `--round` is one dialogue round written as `Role=status,...`. A
//! conditional agreement may carry its conditions as
//! `Role=conditional:conditions`. Roles left out of a round count as pending.

use anyhow::{Context, Result, bail};
use console::style;

use devflow_core::consensus::ConsensusTracker;
use devflow_infra::config::resolve_consensus_config;
use devflow_types::consensus::{ConsensusStatus, ConsensusSummary, RoleStatus};

use super::resolve_template;
use crate::state::AppState;

/// Parse one ballot such as `Product_Strategist=agree,UX_Researcher=conditional`.
///
/// An empty ballot means every role is still pending.
pub fn parse_ballot(raw: &str) -> Result<Vec<RoleStatus>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse_entry)
        .collect()
}

fn parse_entry(entry: &str) -> Result<RoleStatus> {
    let Some((role, rest)) = entry.split_once('=') else {
        bail!("invalid ballot entry '{entry}': expected Role=status");
    };
    let role = role.trim();
    if role.is_empty() {
        bail!("invalid ballot entry '{entry}': missing role name");
    }

    let (status, conditions) = match rest.split_once(':') {
        Some((status, conditions)) => (status, Some(conditions.trim())),
        None => (rest, None),
    };
    let status = status
        .trim()
        .parse::<ConsensusStatus>()
        .map_err(anyhow::Error::msg)?;

    let entry_status = RoleStatus::new(role, status);
    match conditions {
        None => Ok(entry_status),
        Some(_) if status != ConsensusStatus::Conditional => {
            bail!("invalid ballot entry '{entry}': only conditional agreements take conditions")
        }
        Some("") => bail!("invalid ballot entry '{entry}': empty conditions"),
        Some(text) => Ok(entry_status.with_conditions(text)),
    }
}

/// Fold ballots into a summary for one step.
pub fn tally(state: &AppState, raw_step: i64, rounds: &[String]) -> Result<ConsensusSummary> {
    let template = resolve_template(&state.registry, raw_step)?;
    let mut tracker = ConsensusTracker::new(template, resolve_consensus_config(&state.config));

    for (i, raw) in rounds.iter().enumerate() {
        let ballot = parse_ballot(raw).with_context(|| format!("round {}", i + 1))?;
        tracker
            .record_round(ballot)
            .with_context(|| format!("round {}", i + 1))?;
    }

    Ok(tracker.summary())
}

fn status_style(status: ConsensusStatus) -> console::StyledObject<&'static str> {
    let label = status.as_str();
    match status {
        ConsensusStatus::Agree => style(label).green(),
        ConsensusStatus::Disagree => style(label).red(),
        ConsensusStatus::Conditional => style(label).yellow(),
        ConsensusStatus::Pending => style(label).dim(),
    }
}

pub fn run_consensus(
    state: &AppState,
    raw_step: i64,
    rounds: &[String],
    json: bool,
    quiet: bool,
) -> Result<()> {
    let summary = tally(state, raw_step, rounds)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    if quiet {
        println!("{}", summary.reason);
        return Ok(());
    }

    let template = state.registry.get_template(summary.step_id)?;

    println!();
    println!(
        "  {} Consensus for step {} ({})",
        style("*").green().bold(),
        summary.step_id,
        style(&template.name).cyan()
    );
    println!();

    let verdict = if summary.reached {
        style(summary.reason.to_string()).green().bold()
    } else {
        style(summary.reason.to_string()).yellow()
    };
    println!("  Result: {verdict}");
    println!("  Rounds: {}", summary.total_rounds);
    println!();

    if !summary.role_statuses.is_empty() {
        println!("  {}", style("── Last round ──").dim());
        for entry in &summary.role_statuses {
            println!("  {:<28} {}", entry.role, status_style(entry.status));
        }
        println!();
    }

    if !summary.conditional_roles.is_empty() {
        println!("  {}", style("── Conditions ──").dim());
        for entry in &summary.conditional_roles {
            let conditions = entry.conditions.as_deref().unwrap_or("(none stated)");
            println!("  {:<28} {}", entry.role, conditions);
        }
        println!();
    }

    if !summary.conflicts.is_empty() {
        println!("  {}", style("── Disagreements ──").dim());
        for conflict in &summary.conflicts {
            println!(
                "  Round {:<3} {}",
                conflict.round,
                style(conflict.roles.join(", ")).red()
            );
        }
        println!();
    }

    if summary.escalation_required {
        println!(
            "  {} Round limit reached without consensus; a user decision is required.",
            style("!").red().bold()
        );
        println!();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use devflow_types::consensus::ConsensusReason;

    const STEP_1_ROLES: [&str; 3] = ["Product_Strategist", "Technical_Architect", "UX_Researcher"];

    fn unanimous(status: &str) -> String {
        STEP_1_ROLES
            .iter()
            .map(|role| format!("{role}={status}"))
            .collect::<Vec<_>>()
            .join(",")
    }

    #[test]
    fn test_parse_ballot() {
        let ballot = parse_ballot("Product_Strategist=agree, UX_Researcher = conditional").unwrap();
        assert_eq!(
            ballot,
            vec![
                RoleStatus::new("Product_Strategist", ConsensusStatus::Agree),
                RoleStatus::new("UX_Researcher", ConsensusStatus::Conditional),
            ]
        );
    }

    #[test]
    fn test_parse_ballot_with_conditions() {
        let ballot = parse_ballot("UX_Researcher=conditional: usability study first").unwrap();
        assert_eq!(
            ballot,
            vec![
                RoleStatus::new("UX_Researcher", ConsensusStatus::Conditional)
                    .with_conditions("usability study first")
            ]
        );

        assert!(parse_ballot("UX_Researcher=agree:whatever").is_err());
        assert!(parse_ballot("UX_Researcher=conditional:").is_err());
    }

    #[test]
    fn test_parse_empty_ballot() {
        assert!(parse_ballot("").unwrap().is_empty());
        assert!(parse_ballot(" , ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_ballot_errors() {
        assert!(parse_ballot("Product_Strategist").is_err());
        assert!(parse_ballot("=agree").is_err());
        let err = parse_ballot("Product_Strategist=maybe").unwrap_err();
        assert!(err.to_string().contains("invalid consensus status"));
    }

    #[test]
    fn test_tally_reaches_consensus() {
        let state = AppState::builtin();
        let rounds = vec![unanimous("disagree"), unanimous("agree")];
        let summary = tally(&state, 1, &rounds).unwrap();
        assert!(summary.reached);
        assert_eq!(summary.reason, ConsensusReason::ConsensusReached);
        assert_eq!(summary.total_rounds, 2);
        assert_eq!(summary.conflicts.len(), 1);
        assert!(!summary.escalation_required);
    }

    #[test]
    fn test_tally_single_round_is_not_enough() {
        let state = AppState::builtin();
        let summary = tally(&state, 1, &[unanimous("agree")]).unwrap();
        assert!(!summary.reached);
        assert_eq!(summary.reason, ConsensusReason::MinimumRoundsNotReached);
    }

    #[test]
    fn test_tally_escalates_at_round_limit() {
        let state = AppState::builtin();
        let holdout =
            "Product_Strategist=agree,Technical_Architect=disagree,UX_Researcher=agree".to_string();
        let rounds = vec![holdout; 5];

        let summary = tally(&state, 1, &rounds).unwrap();
        assert!(!summary.reached);
        assert!(summary.escalation_required);
        assert_eq!(summary.conflicts.len(), 5);
        assert!(
            summary
                .conflicts
                .iter()
                .all(|c| c.roles == vec!["Technical_Architect".to_string()])
        );
    }

    #[test]
    fn test_tally_keeps_step_role_order() {
        let state = AppState::builtin();
        let summary = tally(&state, 1, &["UX_Researcher=agree".to_string()]).unwrap();
        let order: Vec<&str> = summary.role_statuses.iter().map(|e| e.role.as_str()).collect();
        assert_eq!(order, STEP_1_ROLES);
    }

    #[test]
    fn test_tally_rejects_unknown_role_and_step() {
        let state = AppState::builtin();
        let err = tally(&state, 1, &["Janitor=agree".to_string()]).unwrap_err();
        assert!(format!("{err:#}").contains("Janitor"));

        let err = tally(&state, 42, &[]).unwrap_err();
        assert_eq!(err.to_string(), "step 42 template not found");
    }
}
