//! Plan orchestrator - sequences research, paraphrase and planning
//!
//! The orchestrator is the service surface of the core crate. Each
//! operation runs its outbound calls strictly in order (research completes
//! before paraphrasing, paraphrasing before plan generation) and persists
//! the resulting session state wholesale through the injected store.

use std::sync::Arc;

use tracing::{info, warn};

use crate::agents::traits::{Planning, Research};
use crate::agents::verifier::VerifierAgent;
use crate::error::{Error, Result};
use crate::plan::{Plan, SessionState};
use crate::state::StateStore;

/// Outcome of a planning operation
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// A valid plan was produced and persisted
    Planned {
        /// Paraphrased, clarified restatement of the idea
        refined_idea: String,
        /// The generated plan
        plan: Plan,
    },
    /// The model never produced a parsable, valid plan
    PlanUnavailable {
        /// The refined idea is still returned so the caller can retry
        refined_idea: String,
    },
}

/// Orchestrates the idea-to-plan flow over injected collaborators
pub struct PlanOrchestrator {
    research: Arc<dyn Research>,
    planning: Arc<dyn Planning>,
    verifier: VerifierAgent,
    store: Arc<dyn StateStore>,
}

impl PlanOrchestrator {
    /// Create an orchestrator over the given collaborators and store
    pub fn new(
        research: Arc<dyn Research>,
        planning: Arc<dyn Planning>,
        verifier: VerifierAgent,
        store: Arc<dyn StateStore>,
    ) -> Self {
        Self {
            research,
            planning,
            verifier,
            store,
        }
    }

    /// Submit a free-text idea: research, paraphrase, generate and persist.
    ///
    /// On success the persisted state holds the idea, the plan and
    /// `current_phase = 1`. A model that never yields a valid plan is an
    /// explicit `PlanUnavailable` outcome, not an error.
    pub async fn submit_idea(&self, idea: &str) -> Result<SubmitOutcome> {
        let idea = idea.trim();
        if idea.is_empty() {
            return Err(Error::InvalidInput("idea must not be empty".to_string()));
        }

        let mut state = self.store.load().await?;
        state.idea = Some(idea.to_string());
        self.store.save(&state).await?;

        let research = self.research.research_topic(idea).await;
        let refined_idea = self.planning.paraphrase_idea(idea, &research).await;

        let Some(plan) = self.planning.generate_plan(&refined_idea).await else {
            warn!("LLM failed to generate a valid plan");
            return Ok(SubmitOutcome::PlanUnavailable { refined_idea });
        };

        info!(phases = plan.phases.len(), "Generated execution plan");

        state.plan = Some(plan.clone());
        state.current_phase = Some(1);
        self.store.save(&state).await?;

        Ok(SubmitOutcome::Planned { refined_idea, plan })
    }

    /// Return the current persisted session state verbatim
    pub async fn state(&self) -> Result<SessionState> {
        self.store.load().await
    }

    /// Generate clarifying questions for an idea; nothing is persisted
    pub async fn clarify(&self, idea: &str) -> Result<String> {
        let idea = idea.trim();
        if idea.is_empty() {
            return Err(Error::InvalidInput("idea must not be empty".to_string()));
        }

        Ok(self.planning.clarifying_questions(idea).await)
    }

    /// Update the persisted plan from user feedback.
    ///
    /// Phases up to and including the persisted `current_phase` are kept
    /// unchanged; later phases are revised per the feedback. Requires a
    /// plan on file.
    pub async fn apply_feedback(&self, feedback: &str) -> Result<SubmitOutcome> {
        let mut state = self.store.load().await?;

        let Some(current) = state.plan.clone() else {
            return Err(Error::InvalidInput(
                "no plan on file, submit an idea first".to_string(),
            ));
        };
        let current_phase = state.current_phase.unwrap_or(1);
        let refined_idea = state.idea.clone().unwrap_or_default();

        let Some(plan) = self
            .planning
            .update_plan(&current, feedback, current_phase)
            .await
        else {
            warn!("LLM failed to produce a valid updated plan");
            return Ok(SubmitOutcome::PlanUnavailable { refined_idea });
        };

        info!(phases = plan.phases.len(), "Updated execution plan");

        state.plan = Some(plan.clone());
        self.store.save(&state).await?;

        Ok(SubmitOutcome::Planned { refined_idea, plan })
    }

    /// Verify the persisted plan's current phase against a repository.
    ///
    /// Side-effect free: a successful verification does not advance
    /// `current_phase`. Returns the phase number checked alongside the
    /// outcome.
    pub async fn verify_current_phase(&self, repo_url: &str) -> Result<(u32, bool)> {
        let state = self.store.load().await?;

        let Some(plan) = state.plan.as_ref() else {
            return Err(Error::InvalidInput(
                "no plan on file, submit an idea first".to_string(),
            ));
        };
        let current_phase = state.current_phase.unwrap_or(1);

        let Some(phase) = plan.phase(current_phase) else {
            return Err(Error::InvalidInput(format!(
                "plan has no phase {}",
                current_phase
            )));
        };

        let verified = self.verifier.verify_phase(repo_url, phase).await;
        Ok((current_phase, verified))
    }
}
