//! NVIDIA API Catalog wire types: OpenAI-compatible chat and embeddings,
//! plus the NeMo retriever reranking endpoint.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormatSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
}

/// `{"type": "json_object"}`.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseFormatSpec {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ChatMessage,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingsRequest {
    pub model: String,
    pub input: Vec<String>,
    pub encoding_format: &'static str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingsResponse {
    #[serde(default)]
    pub data: Vec<EmbeddingData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingData {
    #[serde(default)]
    pub index: Option<usize>,
    pub embedding: Vec<f32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RerankingRequest {
    pub model: String,
    pub query: TextItem,
    pub passages: Vec<TextItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TextItem {
    pub text: String,
}

/// Rankings arrive under `rankings` (NeMo retriever) or `results`.
#[derive(Debug, Clone, Deserialize)]
pub struct RerankingResponse {
    #[serde(default, alias = "results")]
    pub rankings: Vec<Ranking>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ranking {
    /// Passage index. Falls back to the entry's position when absent.
    #[serde(default)]
    pub index: Option<usize>,
    #[serde(default)]
    pub logit: Option<f64>,
    #[serde(default)]
    pub score: Option<f64>,
}

impl Ranking {
    pub fn relevance(&self) -> f64 {
        self.logit.or(self.score).unwrap_or(0.0)
    }
}
