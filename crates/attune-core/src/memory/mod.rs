//! Long-term semantic memory for Attune.
//!
//! `MemoryRepository` is the storage port implemented in attune-infra;
//! `MemoryService` embeds, scores and reranks records on top of it.

pub mod service;
pub mod similarity;
pub mod store;

use attune_types::error::RepositoryError;
use attune_types::llm::LlmError;

/// Errors from storing or retrieving memories.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    #[error("memory model call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("memory storage failed: {0}")]
    Repository(#[from] RepositoryError),
}
