//! Consensus tracking across dialogue rounds for a single step.
//!
//! Roles discuss a step's topics over several rounds. After each round every
//! role reports a `ConsensusStatus`; the tracker decides whether the step's
//! "all roles agree" criterion holds, bounded by minimum and maximum round
//! counts from configuration. Once the round limit is hit without agreement
//! the step needs a user decision.

use devflow_types::catalog::{StepId, StepTemplate};
use devflow_types::config::ConsensusConfig;
use devflow_types::consensus::{
    ConsensusOutcome, ConsensusReason, ConsensusStatus, ConsensusSummary, RoleStatus, RoundBallot,
    RoundConflict,
};
use devflow_types::error::CatalogError;

/// Records dialogue rounds for one step and evaluates agreement.
#[derive(Debug, Clone)]
pub struct ConsensusTracker {
    step_id: StepId,
    role_names: Vec<String>,
    rounds: Vec<RoundBallot>,
    min_rounds: usize,
    max_rounds: usize,
}

impl ConsensusTracker {
    /// Start tracking for a step's roles. Bounds are taken as-is; callers
    /// should clamp them first (see `devflow_infra::config`).
    pub fn new(template: &StepTemplate, config: ConsensusConfig) -> Self {
        Self {
            step_id: template.step_id,
            role_names: template.roles.iter().map(|r| r.name.clone()).collect(),
            rounds: Vec::new(),
            min_rounds: config.min_rounds as usize,
            max_rounds: config.max_rounds as usize,
        }
    }

    pub fn step_id(&self) -> StepId {
        self.step_id
    }

    pub fn rounds(&self) -> &[RoundBallot] {
        &self.rounds
    }

    /// Record one round of statuses.
    ///
    /// The ballot keeps the step's role order. Roles absent from `statuses`
    /// are recorded as `pending`. A role that does not belong to the step is
    /// rejected and nothing is recorded.
    pub fn record_round<I>(&mut self, statuses: I) -> Result<(), CatalogError>
    where
        I: IntoIterator<Item = RoleStatus>,
    {
        let mut ballot: RoundBallot = self
            .role_names
            .iter()
            .map(|name| RoleStatus::new(name.clone(), ConsensusStatus::Pending))
            .collect();

        for entry in statuses {
            match ballot.iter_mut().find(|slot| slot.role == entry.role) {
                Some(slot) => *slot = entry,
                None => {
                    return Err(CatalogError::UnknownRole {
                        step_id: self.step_id,
                        role: entry.role,
                    });
                }
            }
        }

        tracing::debug!(
            step_id = self.step_id,
            round = self.rounds.len() + 1,
            "consensus round recorded"
        );
        self.rounds.push(ballot);
        Ok(())
    }

    /// Evaluate the recorded rounds.
    pub fn check(&self) -> ConsensusOutcome {
        let not_reached = |reason| ConsensusOutcome {
            reached: false,
            reason,
        };

        if self.rounds.len() < self.min_rounds {
            return not_reached(ConsensusReason::MinimumRoundsNotReached);
        }
        if self.rounds.len() > self.max_rounds {
            return not_reached(ConsensusReason::MaximumRoundsExceeded);
        }

        let all_agree = self.rounds.last().is_some_and(|ballot| {
            ballot
                .iter()
                .all(|entry| entry.status == ConsensusStatus::Agree)
        });
        if !all_agree {
            return not_reached(ConsensusReason::NotAllRolesAgree);
        }

        ConsensusOutcome {
            reached: true,
            reason: ConsensusReason::ConsensusReached,
        }
    }

    /// Disagreeing roles for every round that had at least one.
    pub fn conflicts(&self) -> Vec<RoundConflict> {
        self.rounds
            .iter()
            .enumerate()
            .filter_map(|(i, ballot)| {
                let roles: Vec<String> = ballot
                    .iter()
                    .filter(|entry| entry.status == ConsensusStatus::Disagree)
                    .map(|entry| entry.role.clone())
                    .collect();
                (!roles.is_empty()).then_some(RoundConflict {
                    round: i + 1,
                    roles,
                })
            })
            .collect()
    }

    /// Outcome plus escalation state, conflicts and the last round's statuses.
    pub fn summary(&self) -> ConsensusSummary {
        let outcome = self.check();
        let escalation_required = !outcome.reached && self.rounds.len() >= self.max_rounds;
        let role_statuses = self.rounds.last().cloned().unwrap_or_default();
        let conditional_roles = role_statuses
            .iter()
            .filter(|entry| entry.status == ConsensusStatus::Conditional)
            .cloned()
            .collect();

        if escalation_required {
            tracing::info!(
                step_id = self.step_id,
                rounds = self.rounds.len(),
                "consensus not reached within round limit, escalating"
            );
        }

        ConsensusSummary {
            step_id: self.step_id,
            reached: outcome.reached,
            reason: outcome.reason,
            total_rounds: self.rounds.len(),
            escalation_required,
            conflicts: self.conflicts(),
            conditional_roles,
            role_statuses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devflow_types::catalog::Role;

    const ROLES: [&str; 3] = ["Product_Strategist", "Technical_Architect", "UX_Researcher"];

    fn template() -> StepTemplate {
        let mut step = StepTemplate::new(1, "Project Definition", vec![]);
        for name in ROLES {
            step.add_role(Role::new(name, "f", "v", "c"));
        }
        step
    }

    fn tracker() -> ConsensusTracker {
        ConsensusTracker::new(&template(), ConsensusConfig::default())
    }

    fn all(status: ConsensusStatus) -> Vec<RoleStatus> {
        ROLES.iter().map(|n| RoleStatus::new(*n, status)).collect()
    }

    #[test]
    fn test_minimum_rounds_required() {
        let mut t = tracker();
        assert_eq!(t.check().reason, ConsensusReason::MinimumRoundsNotReached);

        t.record_round(all(ConsensusStatus::Agree)).unwrap();
        let outcome = t.check();
        assert!(!outcome.reached);
        assert_eq!(outcome.reason, ConsensusReason::MinimumRoundsNotReached);
    }

    #[test]
    fn test_consensus_reached_when_last_round_agrees() {
        let mut t = tracker();
        t.record_round(all(ConsensusStatus::Disagree)).unwrap();
        t.record_round(all(ConsensusStatus::Agree)).unwrap();
        let outcome = t.check();
        assert!(outcome.reached);
        assert_eq!(outcome.reason, ConsensusReason::ConsensusReached);
        assert!(!t.summary().escalation_required);
    }

    #[test]
    fn test_missing_roles_default_to_pending() {
        let mut t = tracker();
        t.record_round(all(ConsensusStatus::Agree)).unwrap();
        t.record_round(vec![
            RoleStatus::new("Product_Strategist", ConsensusStatus::Agree),
            RoleStatus::new("Technical_Architect", ConsensusStatus::Agree),
        ])
        .unwrap();
        assert_eq!(t.check().reason, ConsensusReason::NotAllRolesAgree);
        assert_eq!(t.rounds()[1][2].role, "UX_Researcher");
        assert_eq!(t.rounds()[1][2].status, ConsensusStatus::Pending);
    }

    #[test]
    fn test_ballot_keeps_step_role_order() {
        let mut t = tracker();
        t.record_round(vec![
            RoleStatus::new("UX_Researcher", ConsensusStatus::Agree),
            RoleStatus::new("Product_Strategist", ConsensusStatus::Disagree),
        ])
        .unwrap();

        let order: Vec<&str> = t.rounds()[0].iter().map(|e| e.role.as_str()).collect();
        assert_eq!(order, ROLES);
    }

    #[test]
    fn test_maximum_rounds_exceeded() {
        let config = ConsensusConfig {
            min_rounds: 1,
            max_rounds: 2,
        };
        let mut t = ConsensusTracker::new(&template(), config);
        for _ in 0..3 {
            t.record_round(all(ConsensusStatus::Agree)).unwrap();
        }
        assert_eq!(t.check().reason, ConsensusReason::MaximumRoundsExceeded);
        assert!(t.summary().escalation_required);
    }

    #[test]
    fn test_escalation_with_persistent_disagreement() {
        let mut t = tracker();
        let holdout = || {
            vec![
                RoleStatus::new("Product_Strategist", ConsensusStatus::Agree),
                RoleStatus::new("Technical_Architect", ConsensusStatus::Disagree),
                RoleStatus::new("UX_Researcher", ConsensusStatus::Agree),
            ]
        };

        for round in 1..=5 {
            t.record_round(holdout()).unwrap();
            let summary = t.summary();
            assert_eq!(summary.escalation_required, round == 5, "round {round}");
        }

        t.record_round(holdout()).unwrap();
        let summary = t.summary();
        assert!(!summary.reached);
        assert_eq!(summary.reason, ConsensusReason::MaximumRoundsExceeded);
        assert!(summary.escalation_required);
        assert_eq!(summary.conflicts.len(), 6);
        for (i, conflict) in summary.conflicts.iter().enumerate() {
            assert_eq!(conflict.round, i + 1);
            assert_eq!(conflict.roles, vec!["Technical_Architect".to_string()]);
        }
    }

    #[test]
    fn test_conflicts_skip_rounds_without_disagreement() {
        let mut t = tracker();
        t.record_round(all(ConsensusStatus::Pending)).unwrap();
        t.record_round(all(ConsensusStatus::Disagree)).unwrap();
        t.record_round(all(ConsensusStatus::Agree)).unwrap();

        let conflicts = t.conflicts();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].round, 2);
        assert_eq!(conflicts[0].roles.len(), 3);
    }

    #[test]
    fn test_unknown_role_rejected_without_recording() {
        let mut t = tracker();
        let err = t
            .record_round(vec![RoleStatus::new("Janitor", ConsensusStatus::Agree)])
            .unwrap_err();
        assert!(matches!(err, CatalogError::UnknownRole { step_id: 1, .. }));
        assert!(t.rounds().is_empty());
    }

    #[test]
    fn test_summary_lists_conditional_roles() {
        let mut t = tracker();
        t.record_round(all(ConsensusStatus::Pending)).unwrap();
        t.record_round(vec![
            RoleStatus::new("Product_Strategist", ConsensusStatus::Agree),
            RoleStatus::new("Technical_Architect", ConsensusStatus::Conditional)
                .with_conditions("load test before launch"),
            RoleStatus::new("UX_Researcher", ConsensusStatus::Agree),
        ])
        .unwrap();

        let summary = t.summary();
        assert_eq!(summary.step_id, 1);
        assert!(!summary.reached);
        assert!(!summary.escalation_required);
        assert_eq!(summary.total_rounds, 2);
        assert_eq!(summary.conditional_roles.len(), 1);
        assert_eq!(summary.conditional_roles[0].role, "Technical_Architect");
        assert_eq!(
            summary.conditional_roles[0].conditions.as_deref(),
            Some("load test before launch")
        );
        assert_eq!(summary.role_statuses.len(), 3);
    }

    #[test]
    fn test_summary_without_rounds() {
        let summary = tracker().summary();
        assert_eq!(summary.total_rounds, 0);
        assert!(!summary.escalation_required);
        assert!(summary.conflicts.is_empty());
        assert!(summary.role_statuses.is_empty());
        assert!(summary.conditional_roles.is_empty());
    }
}
