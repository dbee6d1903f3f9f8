//! Plan model - phased execution plans and session state
//!
//! A `Plan` is an ordered sequence of `Phase`s produced by the planner
//! agent from a refined idea. Each phase carries concrete tasks and the
//! exact commit message expected when the phase is completed, which the
//! verifier agent later matches against a repository's latest commit.

pub mod parser;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One unit of planned work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    /// 1-based phase number, unique and increasing within a plan
    pub phase: u32,
    /// Concrete tasks to complete in this phase
    pub tasks: Vec<String>,
    /// Exact suggested commit message marking phase completion
    pub commit_message: String,
}

/// A phased execution plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// Declared number of phases; must match `phases.len()`
    pub total_phases: u32,
    /// Ordered sequence of phases
    pub phases: Vec<Phase>,
}

impl Plan {
    /// Check the structural invariants the LLM is instructed to honor:
    /// the declared phase count matches the actual one, and phase numbers
    /// are 1-based and strictly increasing.
    pub fn validate(&self) -> Result<()> {
        if self.total_phases as usize != self.phases.len() {
            return Err(Error::InvalidInput(format!(
                "plan declares {} phases but contains {}",
                self.total_phases,
                self.phases.len()
            )));
        }

        let mut previous = 0u32;
        for phase in &self.phases {
            if phase.phase <= previous {
                return Err(Error::InvalidInput(format!(
                    "phase numbers must be strictly increasing, got {} after {}",
                    phase.phase, previous
                )));
            }
            previous = phase.phase;
        }

        Ok(())
    }

    /// Look up a phase by its number
    pub fn phase(&self, number: u32) -> Option<&Phase> {
        self.phases.iter().find(|p| p.phase == number)
    }
}

/// The current session: idea, plan and progress marker
///
/// A single mutable singleton, persisted as one JSON document and
/// overwritten wholesale on every save. There is no identity beyond
/// "the current session".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// The user's free-text project concept
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idea: Option<String>,
    /// The generated plan, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<Plan>,
    /// 1-based number of the phase currently in progress
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_phase: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phase(n: u32) -> Phase {
        Phase {
            phase: n,
            tasks: vec![format!("task for phase {}", n)],
            commit_message: format!("feat: complete phase {}", n),
        }
    }

    #[test]
    fn test_valid_plan() {
        let plan = Plan {
            total_phases: 3,
            phases: vec![phase(1), phase(2), phase(3)],
        };
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn test_count_mismatch_rejected() {
        let plan = Plan {
            total_phases: 4,
            phases: vec![phase(1), phase(2)],
        };
        assert!(plan.validate().is_err());
    }

    #[test]
    fn test_non_increasing_numbers_rejected() {
        let plan = Plan {
            total_phases: 3,
            phases: vec![phase(1), phase(3), phase(2)],
        };
        assert!(plan.validate().is_err());

        let plan = Plan {
            total_phases: 2,
            phases: vec![phase(2), phase(2)],
        };
        assert!(plan.validate().is_err());
    }

    #[test]
    fn test_zero_phase_number_rejected() {
        let plan = Plan {
            total_phases: 1,
            phases: vec![phase(0)],
        };
        assert!(plan.validate().is_err());
    }

    #[test]
    fn test_phase_lookup() {
        let plan = Plan {
            total_phases: 2,
            phases: vec![phase(1), phase(2)],
        };
        assert_eq!(plan.phase(2).unwrap().commit_message, "feat: complete phase 2");
        assert!(plan.phase(5).is_none());
    }

    #[test]
    fn test_session_state_default_is_empty() {
        let state = SessionState::default();
        assert!(state.idea.is_none());
        assert!(state.plan.is_none());
        assert!(state.current_phase.is_none());
        // Empty state serializes as an empty object
        assert_eq!(serde_json::to_string(&state).unwrap(), "{}");
    }
}
