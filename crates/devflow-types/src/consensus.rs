//! Consensus tracking types.
//!
//! During a step, each role reports whether it agrees with the current state
//! of the discussion. A `RoundBallot` captures one dialogue round; the tracker
//! in `devflow-core` folds ballots into a `ConsensusSummary`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::StepId;

/// A role's position at the end of a dialogue round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsensusStatus {
    Agree,
    Disagree,
    /// Agrees provided some conditions are met.
    Conditional,
    #[default]
    Pending,
}

impl ConsensusStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsensusStatus::Agree => "agree",
            ConsensusStatus::Disagree => "disagree",
            ConsensusStatus::Conditional => "conditional",
            ConsensusStatus::Pending => "pending",
        }
    }
}

impl fmt::Display for ConsensusStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConsensusStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "agree" => Ok(ConsensusStatus::Agree),
            "disagree" => Ok(ConsensusStatus::Disagree),
            "conditional" => Ok(ConsensusStatus::Conditional),
            "pending" => Ok(ConsensusStatus::Pending),
            other => Err(format!("invalid consensus status: '{other}'")),
        }
    }
}

/// One role's position in a round, with the conditions attached to a
/// conditional agreement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleStatus {
    pub role: String,
    pub status: ConsensusStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<String>,
}

impl RoleStatus {
    pub fn new(role: impl Into<String>, status: ConsensusStatus) -> Self {
        Self {
            role: role.into(),
            status,
            conditions: None,
        }
    }

    pub fn with_conditions(mut self, conditions: impl Into<String>) -> Self {
        self.conditions = Some(conditions.into());
        self
    }
}

/// Statuses for a single dialogue round, in the step's role order.
pub type RoundBallot = Vec<RoleStatus>;

/// Roles that disagreed in one round (rounds are numbered from 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundConflict {
    pub round: usize,
    pub roles: Vec<String>,
}

/// Why consensus was or was not reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsensusReason {
    MinimumRoundsNotReached,
    MaximumRoundsExceeded,
    NotAllRolesAgree,
    ConsensusReached,
}

impl fmt::Display for ConsensusReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ConsensusReason::MinimumRoundsNotReached => "minimum rounds not reached",
            ConsensusReason::MaximumRoundsExceeded => "maximum rounds exceeded",
            ConsensusReason::NotAllRolesAgree => "not all roles agree",
            ConsensusReason::ConsensusReached => "consensus reached",
        };
        f.write_str(text)
    }
}

/// Result of a consensus check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusOutcome {
    pub reached: bool,
    pub reason: ConsensusReason,
}

/// Snapshot of a step's consensus state after the recorded rounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusSummary {
    pub step_id: StepId,
    pub reached: bool,
    pub reason: ConsensusReason,
    pub total_rounds: usize,
    /// The round limit was hit without consensus; a user decision is needed.
    pub escalation_required: bool,
    /// Disagreeing roles per round, for rounds that had any.
    pub conflicts: Vec<RoundConflict>,
    /// Last-round conditional agreements and their conditions.
    pub conditional_roles: Vec<RoleStatus>,
    /// Last-round status per role in step order (empty when no rounds were
    /// recorded).
    pub role_statuses: RoundBallot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_str() {
        assert_eq!("agree".parse::<ConsensusStatus>(), Ok(ConsensusStatus::Agree));
        assert_eq!(" Conditional ".parse::<ConsensusStatus>(), Ok(ConsensusStatus::Conditional));
        let err = "maybe".parse::<ConsensusStatus>().unwrap_err();
        assert_eq!(err, "invalid consensus status: 'maybe'");
    }

    #[test]
    fn test_status_default_is_pending() {
        assert_eq!(ConsensusStatus::default(), ConsensusStatus::Pending);
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(
            ConsensusReason::MinimumRoundsNotReached.to_string(),
            "minimum rounds not reached"
        );
        assert_eq!(ConsensusReason::ConsensusReached.to_string(), "consensus reached");
    }

    #[test]
    fn test_summary_json_shape() {
        let summary = ConsensusSummary {
            step_id: 1,
            reached: false,
            reason: ConsensusReason::NotAllRolesAgree,
            total_rounds: 2,
            escalation_required: false,
            conflicts: vec![RoundConflict {
                round: 1,
                roles: vec!["Product_Strategist".to_string()],
            }],
            conditional_roles: vec![
                RoleStatus::new("UX_Researcher", ConsensusStatus::Conditional)
                    .with_conditions("usability study first"),
            ],
            role_statuses: vec![
                RoleStatus::new("Product_Strategist", ConsensusStatus::Agree),
                RoleStatus::new("UX_Researcher", ConsensusStatus::Conditional)
                    .with_conditions("usability study first"),
            ],
        };
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"reason\":\"not_all_roles_agree\""));
        assert!(json.contains("\"conflicts\":[{\"round\":1,\"roles\":[\"Product_Strategist\"]}]"));
        assert!(json.contains(
            "{\"role\":\"Product_Strategist\",\"status\":\"agree\"}"
        ));
        assert!(json.contains("\"conditions\":\"usability study first\""));
        let parsed: ConsensusSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, summary);
    }
}
