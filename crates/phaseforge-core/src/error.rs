//! Error types for Phaseforge

use thiserror::Error;

/// Result type alias using Phaseforge's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Phaseforge error types
///
/// Collaborator failures (research, LLM, GitHub) are caught at the agent
/// boundary and degraded to benign values, so most of these variants only
/// surface from configuration, persistence, and orchestration code.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Network error: {0}. Check your internet connection.")]
    NetworkError(#[from] reqwest::Error),

    #[error("LLM API error: {0}. Check that GROQ_API_KEY is set.")]
    LlmError(String),

    #[error("Rate limited. Waiting {0} seconds before retry.")]
    RateLimited(u64),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("State persistence error: {0}")]
    StateError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
