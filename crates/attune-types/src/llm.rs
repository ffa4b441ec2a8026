//! Model provider request/response types for Attune.
//!
//! These types model the data shapes shared by every backend: chat
//! completions (free text or JSON), embeddings, reranking, and the error
//! taxonomy the retry layer classifies on.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of a message in a model conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(MessageRole::System),
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A single message in a model conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Whether the caller wants free text or a JSON object back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    #[default]
    Text,
    Json,
}

/// Request to a model provider for a chat completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(default)]
    pub response_format: ResponseFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

impl ChatRequest {
    /// The first system message, if any. Backends honour at most one.
    pub fn system_instruction(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == MessageRole::System)
            .map(|m| m.content.as_str())
    }

    /// All non-system turns in their original order.
    pub fn turns(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.role != MessageRole::System)
    }
}

/// Response from a chat completion.
///
/// `structured` is only populated when the request asked for
/// [`ResponseFormat::Json`] and `text` parsed as JSON. A parse failure is not
/// an error: callers supply their own default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatResponse {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured: Option<serde_json::Value>,
}

impl ChatResponse {
    /// Build a response, parsing `text` as JSON when `format` asks for it.
    pub fn from_text(text: String, format: ResponseFormat) -> Self {
        let structured = match format {
            ResponseFormat::Json => serde_json::from_str(&text).ok(),
            ResponseFormat::Text => None,
        };
        Self { text, structured }
    }
}

/// Request to embed a batch of texts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedRequest {
    pub model: String,
    pub inputs: Vec<String>,
}

/// Request to rerank passages against a query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankRequest {
    pub model: String,
    pub query: String,
    pub passages: Vec<String>,
}

/// Errors from model provider operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// A credential slot or other required setting is missing. Never retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The durable credential counter could not be incremented.
    #[error("credential counter unavailable: {0}")]
    CounterUnavailable(String),

    /// Non-rate-limit backend failure (auth, malformed request, 5xx, timeout).
    #[error("{provider} error (status {status:?}, {latency_ms}ms): {message}")]
    Provider {
        provider: String,
        status: Option<u16>,
        latency_ms: u64,
        message: String,
    },

    /// The backend rejected the call for exceeding a usage quota.
    #[error("{provider} rate limited after {latency_ms}ms (retry after {retry_after_ms:?}ms)")]
    RateLimited {
        provider: String,
        latency_ms: u64,
        retry_after_ms: Option<u64>,
    },

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("{provider} does not support {capability}")]
    Unsupported { provider: String, capability: String },
}

impl LlmError {
    /// Whether the retry policy should rotate credentials and try again.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, LlmError::RateLimited { .. })
    }

    /// Backend HTTP status, when one was observed.
    pub fn status(&self) -> Option<u16> {
        match self {
            LlmError::Provider { status, .. } => *status,
            LlmError::RateLimited { .. } => Some(429),
            _ => None,
        }
    }
}

/// Which operations a provider backend implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderCapabilities {
    pub chat: bool,
    pub embed: bool,
    pub rerank: bool,
}

/// Type of model provider backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Gemini,
    Nvidia,
}

impl ProviderKind {
    /// Name used for the credential counter and credential lookup.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::Nvidia => "nvidia",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "nvidia" => Ok(ProviderKind::Nvidia),
            other => Err(format!("invalid provider kind: '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_role_roundtrip() {
        for role in [MessageRole::System, MessageRole::User, MessageRole::Assistant] {
            let parsed: MessageRole = role.to_string().parse().unwrap();
            assert_eq!(parsed, role);
        }
        assert!("tool".parse::<MessageRole>().is_err());
    }

    #[test]
    fn test_system_instruction_picks_first_system_message() {
        let request = ChatRequest {
            model: "m".to_string(),
            messages: vec![
                Message::system("be kind"),
                Message::user("hi"),
                Message::system("ignored"),
            ],
            response_format: ResponseFormat::Text,
            temperature: None,
        };
        assert_eq!(request.system_instruction(), Some("be kind"));
        assert_eq!(request.turns().count(), 1);
    }

    #[test]
    fn test_chat_response_json_mode_parses() {
        let resp = ChatResponse::from_text(r#"{"route":"chat"}"#.to_string(), ResponseFormat::Json);
        assert_eq!(resp.structured.unwrap()["route"], "chat");
    }

    #[test]
    fn test_chat_response_json_mode_unparseable_is_absent() {
        let resp = ChatResponse::from_text("not json".to_string(), ResponseFormat::Json);
        assert!(resp.structured.is_none());
        assert_eq!(resp.text, "not json");
    }

    #[test]
    fn test_chat_response_text_mode_never_parses() {
        let resp = ChatResponse::from_text("{}".to_string(), ResponseFormat::Text);
        assert!(resp.structured.is_none());
    }

    #[test]
    fn test_rate_limited_classification() {
        let err = LlmError::RateLimited {
            provider: "nvidia".to_string(),
            latency_ms: 40,
            retry_after_ms: None,
        };
        assert!(err.is_rate_limited());
        assert_eq!(err.status(), Some(429));

        let err = LlmError::Provider {
            provider: "gemini".to_string(),
            status: Some(500),
            latency_ms: 12,
            message: "boom".to_string(),
        };
        assert!(!err.is_rate_limited());
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_provider_kind_parse() {
        assert_eq!("Gemini".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
        assert_eq!(ProviderKind::Nvidia.to_string(), "nvidia");
        assert!("openai".parse::<ProviderKind>().is_err());
    }
}
