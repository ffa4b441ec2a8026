//! GeminiProvider -- [`ModelProvider`] for the Google Generative Language API.
//!
//! Chat goes to `models/{model}:generateContent`, embeddings to
//! `models/{model}:batchEmbedContents`. The API key travels as the `key`
//! query parameter. Gemini has no rerank endpoint.

pub mod types;

use std::sync::Arc;
use std::time::Duration;

use attune_core::llm::provider::ModelProvider;
use attune_core::llm::retry::RetryPolicy;
use attune_core::llm::rotation::Credential;
use attune_observe::genai_attrs::{OP_CHAT, OP_EMBEDDINGS, PROVIDER_GEMINI};
use attune_types::llm::{
    ChatRequest, ChatResponse, EmbedRequest, LlmError, MessageRole, ProviderCapabilities,
    ResponseFormat, RerankRequest,
};
use secrecy::ExposeSecret;

use self::types::{
    BatchEmbedRequest, BatchEmbedResponse, Content, EmbedContentRequest, GenerateContentRequest,
    GenerateContentResponse, GenerationConfig, Part,
};
use super::http::{CallContext, build_client, send_json};
use super::DEFAULT_TEMPERATURE;

/// Gemini backend. Holds no key itself; every call draws one from the
/// retry policy's rotator.
pub struct GeminiProvider {
    client: reqwest::Client,
    base_url: String,
    retry: Arc<RetryPolicy>,
    capabilities: ProviderCapabilities,
}

impl GeminiProvider {
    pub fn new(base_url: &str, timeout: Duration, retry: Arc<RetryPolicy>) -> Result<Self, LlmError> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry,
            capabilities: ProviderCapabilities {
                chat: true,
                embed: true,
                rerank: false,
            },
        })
    }

    fn url(&self, model: &str, method: &str) -> String {
        format!("{}/models/{model}:{method}", self.base_url)
    }

    fn to_gemini_request(request: &ChatRequest) -> GenerateContentRequest {
        let contents = request
            .turns()
            .map(|m| Content {
                role: Some(
                    match m.role {
                        MessageRole::Assistant => "model",
                        _ => "user",
                    }
                    .to_string(),
                ),
                parts: vec![Part {
                    text: m.content.clone(),
                }],
            })
            .collect();

        GenerateContentRequest {
            contents,
            system_instruction: request.system_instruction().map(|text| Content {
                role: None,
                parts: vec![Part {
                    text: text.to_string(),
                }],
            }),
            generation_config: GenerationConfig {
                temperature: request.temperature.unwrap_or(DEFAULT_TEMPERATURE),
                response_mime_type: match request.response_format {
                    ResponseFormat::Json => Some("application/json"),
                    ResponseFormat::Text => None,
                },
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
            .query(&[("key", credential.key.expose_secret())])
            .json(body);
        let ctx = CallContext {
            provider: PROVIDER_GEMINI,
            operation,
            model,
            slot: credential.slot,
        };
        send_json(ctx, request).await
    }
}

// GeminiProvider does not derive Debug: its client may carry the key in a
// pending request URL.

impl ModelProvider for GeminiProvider {
    fn name(&self) -> &str {
        PROVIDER_GEMINI
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        let body = Self::to_gemini_request(request);
        let url = self.url(&request.model, "generateContent");

        let response: GenerateContentResponse = self
            .retry
            .execute(PROVIDER_GEMINI, |cred| {
                self.post(&url, &body, OP_CHAT, &request.model, cred)
            })
            .await?;

        Ok(ChatResponse::from_text(
            response.first_text(),
            request.response_format,
        ))
    }

    async fn embed(&self, request: &EmbedRequest) -> Result<Vec<Vec<f32>>, LlmError> {
        if request.inputs.is_empty() {
            return Ok(Vec::new());
        }

        let qualified = format!("models/{}", request.model);
        let body = BatchEmbedRequest {
            requests: request
                .inputs
                .iter()
                .map(|text| EmbedContentRequest {
                    model: qualified.clone(),
                    content: Content {
                        role: None,
                        parts: vec![Part { text: text.clone() }],
                    },
                })
                .collect(),
        };
        let url = self.url(&request.model, "batchEmbedContents");

        let response: BatchEmbedResponse = self
            .retry
            .execute(PROVIDER_GEMINI, |cred| {
                self.post(&url, &body, OP_EMBEDDINGS, &request.model, cred)
            })
            .await?;

        if response.embeddings.len() != request.inputs.len() {
            return Err(LlmError::Deserialization(format!(
                "gemini returned {} embeddings for {} inputs",
                response.embeddings.len(),
                request.inputs.len()
            )));
        }
        Ok(response.embeddings.into_iter().map(|e| e.values).collect())
    }

    async fn rerank(&self, _request: &RerankRequest) -> Result<Vec<usize>, LlmError> {
        Err(LlmError::Unsupported {
            provider: PROVIDER_GEMINI.to_string(),
            capability: "rerank".to_string(),
        })
    }
}
