//! BoxModelProvider -- object-safe dynamic dispatch wrapper for ModelProvider.
//!
//! 1. Define an object-safe `ModelProviderDyn` trait with boxed futures
//! 2. Blanket-impl `ModelProviderDyn` for all `T: ModelProvider`
//! 3. `BoxModelProvider` wraps `Box<dyn ModelProviderDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use attune_types::llm::{
    ChatRequest, ChatResponse, EmbedRequest, LlmError, ProviderCapabilities, RerankRequest,
};

use super::provider::ModelProvider;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, LlmError>> + Send + 'a>>;

/// Object-safe version of [`ModelProvider`] with boxed futures.
pub trait ModelProviderDyn: Send + Sync {
    fn name(&self) -> &str;

    fn capabilities(&self) -> &ProviderCapabilities;

    fn chat_boxed<'a>(&'a self, request: &'a ChatRequest) -> BoxFuture<'a, ChatResponse>;

    fn embed_boxed<'a>(&'a self, request: &'a EmbedRequest) -> BoxFuture<'a, Vec<Vec<f32>>>;

    fn rerank_boxed<'a>(&'a self, request: &'a RerankRequest) -> BoxFuture<'a, Vec<usize>>;
}

/// Blanket implementation: any `ModelProvider` automatically implements `ModelProviderDyn`.
impl<T: ModelProvider> ModelProviderDyn for T {
    fn name(&self) -> &str {
        ModelProvider::name(self)
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        ModelProvider::capabilities(self)
    }

    fn chat_boxed<'a>(&'a self, request: &'a ChatRequest) -> BoxFuture<'a, ChatResponse> {
        Box::pin(self.chat(request))
    }

    fn embed_boxed<'a>(&'a self, request: &'a EmbedRequest) -> BoxFuture<'a, Vec<Vec<f32>>> {
        Box::pin(self.embed(request))
    }

    fn rerank_boxed<'a>(&'a self, request: &'a RerankRequest) -> BoxFuture<'a, Vec<usize>> {
        Box::pin(self.rerank(request))
    }
}

/// Type-erased model provider for runtime backend selection.
///
/// Since `ModelProvider` uses RPITIT, it cannot be used as a trait object
/// directly. `BoxModelProvider` provides equivalent methods that delegate to
/// the inner `ModelProviderDyn` trait object.
pub struct BoxModelProvider {
    inner: Box<dyn ModelProviderDyn + Send + Sync>,
}

impl BoxModelProvider {
    /// Wrap a concrete `ModelProvider` in a type-erased box.
    pub fn new<T: ModelProvider + 'static>(provider: T) -> Self {
        Self {
            inner: Box::new(provider),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn capabilities(&self) -> &ProviderCapabilities {
        self.inner.capabilities()
    }

    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        self.inner.chat_boxed(request).await
    }

    pub async fn embed(&self, request: &EmbedRequest) -> Result<Vec<Vec<f32>>, LlmError> {
        self.inner.embed_boxed(request).await
    }

    pub async fn rerank(&self, request: &RerankRequest) -> Result<Vec<usize>, LlmError> {
        self.inner.rerank_boxed(request).await
    }
}

impl std::fmt::Debug for BoxModelProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxModelProvider")
            .field("name", &self.name())
            .finish()
    }
}
