//! Provider traits for the research and planning agents
//!
//! The orchestrator is written against these traits so tests can inject
//! deterministic stand-ins instead of live Wikipedia/Groq collaborators.

use async_trait::async_trait;

use crate::plan::Plan;

/// Supplies a short topical research summary for an idea
#[async_trait]
pub trait Research: Send + Sync {
    /// Research a topic and return summary text.
    ///
    /// Never fails: no result or any transport problem degrades to a
    /// human-readable message in the returned string.
    async fn research_topic(&self, topic: &str) -> String;
}

/// Converts ideas into paraphrases, plans, questions and plan updates
#[async_trait]
pub trait Planning: Send + Sync {
    /// Restate the idea as a single clarified paragraph using the research
    /// context. Returns whatever text the model produced, empty on failure.
    async fn paraphrase_idea(&self, idea: &str, research_summary: &str) -> String;

    /// Generate a 3-6 phase execution plan for the refined idea.
    /// `None` when the model output never yielded a valid plan.
    async fn generate_plan(&self, refined_idea: &str) -> Option<Plan>;

    /// Generate exactly 3 numbered clarifying questions as plain text.
    /// The count is a prompt instruction, not validated here.
    async fn clarifying_questions(&self, idea: &str) -> String;

    /// Produce a full replacement plan with phases up to and including
    /// `current_phase` echoed unchanged and later phases revised per the
    /// feedback. `None` on unparsable output or when the echoed phases
    /// drifted from the current plan.
    async fn update_plan(&self, current: &Plan, feedback: &str, current_phase: u32)
    -> Option<Plan>;
}
