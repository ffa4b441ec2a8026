//! Response-generating agents for Attune.
//!
//! - `crisis`: keyword screen that runs before anything else
//! - `IntentRouter`: classifies a message into a route
//! - `CoachAgent`: free-text coaching grounded in profile and memories
//! - `AssessmentExplainer`: structured, non-diagnostic screening explanation

pub mod assessment;
pub mod coach;
pub mod crisis;
pub mod router;

use attune_types::llm::LlmError;

use crate::memory::MemoryError;

/// Errors from agents that consult memory before calling a model.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Memory(#[from] MemoryError),
}
