//! Agent system - research, planning and verification collaborators
//!
//! Each agent wraps one external service behind a "never raise" contract:
//! transport and API failures are logged and degraded to a benign value
//! (failure text, empty string, `None` or `false`) so the orchestrator can
//! treat collaborator trouble as data rather than faults.

pub mod planner;
pub mod research;
pub mod traits;
pub mod verifier;

pub use planner::PlannerAgent;
pub use research::ResearchAgent;
pub use traits::{Planning, Research};
pub use verifier::VerifierAgent;
