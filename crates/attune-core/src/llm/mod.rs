//! Model provider abstractions for Attune.
//!
//! - `ModelProvider`: RPITIT trait for concrete backends (chat, embed, rerank)
//! - `BoxModelProvider`: object-safe wrapper for runtime backend selection
//! - `CredentialRotator` / `RetryPolicy`: round-robin keys and rate-limit retry

pub mod box_provider;
pub mod provider;
pub mod retry;
pub mod rotation;
