//! Phaseforge Core Library
//!
//! This crate provides the core functionality for Phaseforge, including:
//! - Plan model (phases, tasks, expected commit messages) and LLM output parsing
//! - Agent system (research, planner, verifier)
//! - LLM integration (Groq OpenAI-compatible API)
//! - Session state persistence (single JSON document)
//! - The plan orchestrator that sequences research, paraphrase and planning

pub mod agents;
pub mod config;
pub mod error;
pub mod llm;
pub mod orchestrator;
pub mod plan;
pub mod state;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::orchestrator::{PlanOrchestrator, SubmitOutcome};
    pub use crate::plan::{Phase, Plan, SessionState};
    pub use crate::state::StateStore;
}
