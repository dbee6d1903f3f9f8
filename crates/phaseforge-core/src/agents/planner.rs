//! Planner agent - idea paraphrasing, plan generation and plan updates
//!
//! All four operations are stateless and ride on one `generate` primitive
//! that sends a single-turn chat request to the configured model. Failure
//! semantics follow the collaborator contract: unusable model output
//! yields an empty string (free-text operations) or `None` (plan-producing
//! operations); nothing here returns an error to the caller.

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::llm::{LlmClient, Message};
use crate::plan::{Plan, parser::extract_plan};

use super::traits::Planning;

/// Planner agent backed by the Groq LLM client
#[derive(Debug, Clone)]
pub struct PlannerAgent {
    client: LlmClient,
}

impl PlannerAgent {
    /// Create a planner agent over an existing LLM client
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }

    /// Send a single-turn prompt and return the model's text reply.
    ///
    /// Any transport or API failure is logged and degraded to an empty
    /// string.
    async fn generate(&self, prompt: String) -> String {
        match self.client.complete(vec![Message::user(prompt)]).await {
            Ok(response) => {
                debug!(
                    tokens = response.tokens_used,
                    model = %response.model,
                    "Planner received LLM response"
                );
                response.content
            }
            Err(e) => {
                error!(error = %e, "LLM generation failed");
                String::new()
            }
        }
    }

    /// Parse and validate a plan-shaped model reply
    fn parse_plan(output: &str) -> Option<Plan> {
        let plan = extract_plan(output)?;
        if let Err(e) = plan.validate() {
            warn!(error = %e, "Generated plan failed validation");
            return None;
        }
        Some(plan)
    }
}

#[async_trait]
impl Planning for PlannerAgent {
    async fn paraphrase_idea(&self, idea: &str, research_summary: &str) -> String {
        info!("Paraphrasing idea");
        self.generate(paraphrase_prompt(idea, research_summary)).await
    }

    async fn generate_plan(&self, refined_idea: &str) -> Option<Plan> {
        info!("Generating execution plan");
        let output = self.generate(plan_prompt(refined_idea)).await;
        Self::parse_plan(&output)
    }

    async fn clarifying_questions(&self, idea: &str) -> String {
        info!("Generating clarifying questions");
        self.generate(questions_prompt(idea)).await
    }

    async fn update_plan(
        &self,
        current: &Plan,
        feedback: &str,
        current_phase: u32,
    ) -> Option<Plan> {
        info!(current_phase, "Updating plan from feedback");

        let current_json = match serde_json::to_string(current) {
            Ok(json) => json,
            Err(e) => {
                error!(error = %e, "Failed to serialize current plan");
                return None;
            }
        };

        let output = self
            .generate(update_prompt(&current_json, feedback, current_phase))
            .await;
        let updated = Self::parse_plan(&output)?;

        // The prompt instructs the model to echo completed phases verbatim;
        // enforce it rather than trusting instruction-following.
        if !echoes_completed_phases(current, &updated, current_phase) {
            warn!(
                current_phase,
                "Updated plan modified completed phases, rejecting"
            );
            return None;
        }

        Some(updated)
    }
}

/// Check that phases up to and including `current_phase` are unchanged
fn echoes_completed_phases(current: &Plan, updated: &Plan, current_phase: u32) -> bool {
    (1..=current_phase).all(|n| current.phase(n) == updated.phase(n))
}

fn paraphrase_prompt(idea: &str, research_summary: &str) -> String {
    format!(
        r#"I have an idea: "{idea}".
Here is some background context: "{research_summary}".

Please rewrite my idea to be clear, actionable, and suitable for a phased execution plan.
Output ONLY the paraphrased idea as a single paragraph."#
    )
}

fn plan_prompt(refined_idea: &str) -> String {
    format!(
        r#"Goal: "{refined_idea}".
Create a phased execution plan (3-6 phases).
For each phase, provide:
1. Phase number
2. 3-5 concrete tasks
3. One exact suggested commit message.

Output MUST be valid JSON format like this:
{{
    "total_phases": 3,
    "phases": [
        {{
            "phase": 1,
            "tasks": ["task 1", "task 2"],
            "commit_message": "feat: complete phase 1"
        }}
    ]
}}"#
    )
}

fn questions_prompt(idea: &str) -> String {
    format!(
        r#"User Idea: "{idea}"

To create a solid execution plan, I need more details.
Generate exactly 3 specific, clarifying questions for the user to help refine the scope and technical details.
Output ONLY the 3 questions as a numbered list."#
    )
}

fn update_prompt(current_plan_json: &str, feedback: &str, current_phase: u32) -> String {
    let next_phase = current_phase + 1;
    format!(
        r#"Current Project Plan: {current_plan_json}
Current Phase: {current_phase}
User Feedback/Changes: "{feedback}"

Update the REMAINING phases (starting from phase {next_phase}) based on this feedback.
Keep the phases that are already completed or in progress (up to {current_phase}) exactly as they are.
Modify, add, or remove future phases as needed.

Output MUST be the full valid JSON plan (including past phases):
{{
    "total_phases": N,
    "phases": [...]
}}"#
    )
}
