//! NvidiaProvider -- [`ModelProvider`] for the NVIDIA API Catalog.
//!
//! Chat and embeddings use the OpenAI-compatible `/chat/completions` and
//! `/embeddings` endpoints; reranking uses `/retrieval/nvidia/reranking` on a
//! separate base URL. All three authenticate with a bearer token.

pub mod types;

use std::sync::Arc;
use std::time::Duration;

use attune_core::llm::provider::ModelProvider;
use attune_core::llm::retry::RetryPolicy;
use attune_core::llm::rotation::Credential;
use attune_observe::genai_attrs::{OP_CHAT, OP_EMBEDDINGS, OP_RERANK, PROVIDER_NVIDIA};
use attune_types::llm::{
    ChatRequest, ChatResponse, EmbedRequest, LlmError, ProviderCapabilities, RerankRequest,
    ResponseFormat,
};
use secrecy::ExposeSecret;

use self::types::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, EmbeddingsRequest,
    EmbeddingsResponse, Ranking, RerankingRequest, RerankingResponse, ResponseFormatSpec,
    TextItem,
};
use super::DEFAULT_TEMPERATURE;
use super::http::{CallContext, build_client, send_json};

pub struct NvidiaProvider {
    client: reqwest::Client,
    base_url: String,
    rerank_base_url: String,
    retry: Arc<RetryPolicy>,
    capabilities: ProviderCapabilities,
}

impl NvidiaProvider {
    pub fn new(
        base_url: &str,
        rerank_base_url: &str,
        timeout: Duration,
        retry: Arc<RetryPolicy>,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            rerank_base_url: rerank_base_url.trim_end_matches('/').to_string(),
            retry,
            capabilities: ProviderCapabilities {
                chat: true,
                embed: true,
                rerank: true,
            },
        })
    }

    /// The system message, if any, is passed through as the leading turn.
    fn to_completion_request(request: &ChatRequest) -> ChatCompletionRequest {
        let system = request
            .system_instruction()
            .map(|text| ChatMessage {
                role: "system".to_string(),
                content: Some(text.to_string()),
            });
        let messages = system
            .into_iter()
            .chain(request.turns().map(|m| ChatMessage {
                role: m.role.to_string(),
                content: Some(m.content.clone()),
            }))
            .collect();

        ChatCompletionRequest {
            model: request.model.clone(),
            messages,
            temperature: request.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            response_format: match request.response_format {
                ResponseFormat::Json => Some(ResponseFormatSpec {
                    kind: "json_object",
                }),
                ResponseFormat::Text => None,
            },
        }
    }

    async fn post<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
        operation: &'static str,
        model: &str,
        credential: Credential,
    ) -> Result<T, LlmError> {
        let request = self
            .client
            .post(url)
            .bearer_auth(credential.key.expose_secret())
            .json(body);
        let ctx = CallContext {
            provider: PROVIDER_NVIDIA,
            operation,
            model,
            slot: credential.slot,
        };
        send_json(ctx, request).await
    }
}

/// Passage indices best-first. Equal scores keep passage order; indices
/// outside `0..passages` are dropped.
fn ranked_indices(mut rankings: Vec<(usize, Ranking)>, passages: usize) -> Vec<usize> {
    rankings.sort_by(|(ia, a), (ib, b)| {
        b.relevance()
            .partial_cmp(&a.relevance())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| ia.cmp(ib))
    });
    rankings
        .into_iter()
        .map(|(idx, _)| idx)
        .filter(|idx| *idx < passages)
        .collect()
}

impl ModelProvider for NvidiaProvider {
    fn name(&self) -> &str {
        PROVIDER_NVIDIA
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        let body = Self::to_completion_request(request);
        let url = format!("{}/chat/completions", self.base_url);

        let response: ChatCompletionResponse = self
            .retry
            .execute(PROVIDER_NVIDIA, |cred| {
                self.post(&url, &body, OP_CHAT, &request.model, cred)
            })
            .await?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        Ok(ChatResponse::from_text(text, request.response_format))
    }

    async fn embed(&self, request: &EmbedRequest) -> Result<Vec<Vec<f32>>, LlmError> {
        if request.inputs.is_empty() {
            return Ok(Vec::new());
        }

        let body = EmbeddingsRequest {
            model: request.model.clone(),
            input: request.inputs.clone(),
            encoding_format: "float",
        };
        let url = format!("{}/embeddings", self.base_url);

        let response: EmbeddingsResponse = self
            .retry
            .execute(PROVIDER_NVIDIA, |cred| {
                self.post(&url, &body, OP_EMBEDDINGS, &request.model, cred)
            })
            .await?;

        if response.data.len() != request.inputs.len() {
            return Err(LlmError::Deserialization(format!(
                "nvidia returned {} embeddings for {} inputs",
                response.data.len(),
                request.inputs.len()
            )));
        }

        let mut data: Vec<(usize, Vec<f32>)> = response
            .data
            .into_iter()
            .enumerate()
            .map(|(pos, d)| (d.index.unwrap_or(pos), d.embedding))
            .collect();
        data.sort_by_key(|(idx, _)| *idx);
        Ok(data.into_iter().map(|(_, v)| v).collect())
    }

    async fn rerank(&self, request: &RerankRequest) -> Result<Vec<usize>, LlmError> {
        if request.passages.is_empty() {
            return Ok(Vec::new());
        }

        let body = RerankingRequest {
            model: request.model.clone(),
            query: TextItem {
                text: request.query.clone(),
            },
            passages: request
                .passages
                .iter()
                .map(|p| TextItem { text: p.clone() })
                .collect(),
        };
        let url = format!("{}/retrieval/nvidia/reranking", self.rerank_base_url);

        let response: RerankingResponse = self
            .retry
            .execute(PROVIDER_NVIDIA, |cred| {
                self.post(&url, &body, OP_RERANK, &request.model, cred)
            })
            .await?;

        let rankings = response
            .rankings
            .into_iter()
            .enumerate()
            .map(|(pos, r)| (r.index.unwrap_or(pos), r))
            .collect();
        Ok(ranked_indices(rankings, request.passages.len()))
    }
}
