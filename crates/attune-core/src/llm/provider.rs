//! ModelProvider trait definition.
//!
//! This is the core abstraction that every model backend implements.
//! Uses RPITIT for all three operations; `BoxModelProvider` adds an
//! object-safe wrapper for runtime backend selection.

use attune_types::llm::{
    ChatRequest, ChatResponse, EmbedRequest, LlmError, ProviderCapabilities, RerankRequest,
};

/// Trait for model provider backends (Gemini, NVIDIA, ...).
///
/// Implementations live in attune-infra and route every outbound call
/// through a [`RetryPolicy`](super::retry::RetryPolicy), so callers never
/// see a rate limit unless the retry budget is exhausted.
pub trait ModelProvider: Send + Sync {
    /// Provider name (e.g., "gemini", "nvidia"). Also the credential pool name.
    fn name(&self) -> &str;

    /// Which of chat / embed / rerank this backend implements.
    fn capabilities(&self) -> &ProviderCapabilities;

    /// Send a chat completion request.
    ///
    /// In JSON mode an unparseable reply is returned with `structured: None`
    /// rather than as an error.
    fn chat(
        &self,
        request: &ChatRequest,
    ) -> impl std::future::Future<Output = Result<ChatResponse, LlmError>> + Send;

    /// Embed each input. Returns one vector per input, in input order.
    fn embed(
        &self,
        request: &EmbedRequest,
    ) -> impl std::future::Future<Output = Result<Vec<Vec<f32>>, LlmError>> + Send;

    /// Rank passages against the query. Returns passage indices, best first.
    fn rerank(
        &self,
        request: &RerankRequest,
    ) -> impl std::future::Future<Output = Result<Vec<usize>, LlmError>> + Send;
}
