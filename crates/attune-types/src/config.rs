//! Global configuration types for Attune.
//!
//! `GlobalConfig` represents the top-level `config.toml`: which models each
//! agent uses, how credentials rotate, how memory retrieval is bounded, and
//! where the model backends live. Every field has a default.

use serde::{Deserialize, Serialize};

use crate::llm::ProviderKind;

/// Top-level configuration for Attune.
///
/// Loaded from `~/.attune/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub models: ModelConfig,
    #[serde(default)]
    pub rotation: RotationConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub providers: ProviderEndpoints,
}

/// Model selection per agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Backend that serves chat completions (router, coach, explainer).
    #[serde(default = "default_chat_provider")]
    pub chat_provider: ProviderKind,
    /// Backend that serves embeddings and reranking.
    #[serde(default = "default_memory_provider")]
    pub memory_provider: ProviderKind,
    #[serde(default = "default_router_model")]
    pub router: String,
    #[serde(default = "default_coach_model")]
    pub coach: String,
    #[serde(default = "default_explainer_model")]
    pub explainer: String,
    /// Used by the explainer when the screening total exceeds the escalation threshold.
    #[serde(default = "default_explainer_escalated_model")]
    pub explainer_escalated: String,
    #[serde(default = "default_embedding_model")]
    pub embedding: String,
    #[serde(default = "default_rerank_model")]
    pub rerank: String,
}

fn default_chat_provider() -> ProviderKind {
    ProviderKind::Gemini
}

fn default_memory_provider() -> ProviderKind {
    ProviderKind::Nvidia
}

fn default_router_model() -> String {
    "gemini-2.5-flash-lite".to_string()
}

fn default_coach_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_explainer_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_explainer_escalated_model() -> String {
    "gemini-2.5-pro".to_string()
}

fn default_embedding_model() -> String {
    "nvidia/nv-embedqa-e5-v5".to_string()
}

fn default_rerank_model() -> String {
    "nvidia/reranking-4b".to_string()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            chat_provider: default_chat_provider(),
            memory_provider: default_memory_provider(),
            router: default_router_model(),
            coach: default_coach_model(),
            explainer: default_explainer_model(),
            explainer_escalated: default_explainer_escalated_model(),
            embedding: default_embedding_model(),
            rerank: default_rerank_model(),
        }
    }
}

/// Credential rotation and rate-limit retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationConfig {
    /// Number of credential slots per provider (`{PROVIDER}_API_1..=pool_size`).
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    /// Total attempts (first call included) before a rate limit is surfaced.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Backoff unit; attempt `n` waits `n * base_delay_ms` before retrying.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

fn default_pool_size() -> u32 {
    5
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            pool_size: default_pool_size(),
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

/// What to do when the memory write-back after a reply fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryWritePolicy {
    /// Fail the whole request.
    #[default]
    Strict,
    /// Return the reply and report the failure alongside it.
    BestEffort,
}

/// Memory retrieval bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// How many of the owner's most recent records are scored per query.
    #[serde(default = "default_candidate_window")]
    pub candidate_window: u32,
    /// How many memories the coach pulls into its prompt.
    #[serde(default = "default_coach_limit")]
    pub coach_limit: usize,
    #[serde(default)]
    pub write_policy: MemoryWritePolicy,
}

fn default_candidate_window() -> u32 {
    20
}

fn default_coach_limit() -> usize {
    5
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            candidate_window: default_candidate_window(),
            coach_limit: default_coach_limit(),
            write_policy: MemoryWritePolicy::default(),
        }
    }
}

/// Base URLs and network settings for the model backends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderEndpoints {
    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,
    /// Chat completions and embeddings.
    #[serde(default = "default_nvidia_base_url")]
    pub nvidia_base_url: String,
    #[serde(default = "default_nvidia_rerank_base_url")]
    pub nvidia_rerank_base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_nvidia_base_url() -> String {
    "https://integrate.api.nvidia.com/v1".to_string()
}

fn default_nvidia_rerank_base_url() -> String {
    "https://ai.api.nvidia.com/v1".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            gemini_base_url: default_gemini_base_url(),
            nvidia_base_url: default_nvidia_base_url(),
            nvidia_rerank_base_url: default_nvidia_rerank_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_config_default_values() {
        let config = GlobalConfig::default();
        assert_eq!(config.rotation.pool_size, 5);
        assert_eq!(config.rotation.max_attempts, 3);
        assert_eq!(config.rotation.base_delay_ms, 1000);
        assert_eq!(config.memory.candidate_window, 20);
        assert_eq!(config.memory.write_policy, MemoryWritePolicy::Strict);
        assert_eq!(config.models.chat_provider, ProviderKind::Gemini);
        assert_eq!(config.models.memory_provider, ProviderKind::Nvidia);
    }

    #[test]
    fn test_global_config_deserialize_with_defaults() {
        let config: GlobalConfig = toml::from_str("").unwrap();
        assert_eq!(config.models.router, "gemini-2.5-flash-lite");
        assert_eq!(config.models.explainer_escalated, "gemini-2.5-pro");
        assert_eq!(config.providers.request_timeout_secs, 60);
    }

    #[test]
    fn test_global_config_deserialize_with_values() {
        let toml_str = r#"
[models]
chat_provider = "nvidia"
coach = "meta/llama-3.1-70b-instruct"

[rotation]
pool_size = 3

[memory]
candidate_window = 50
write_policy = "best_effort"
"#;
        let config: GlobalConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.models.chat_provider, ProviderKind::Nvidia);
        assert_eq!(config.models.coach, "meta/llama-3.1-70b-instruct");
        assert_eq!(config.models.router, "gemini-2.5-flash-lite");
        assert_eq!(config.rotation.pool_size, 3);
        assert_eq!(config.rotation.max_attempts, 3);
        assert_eq!(config.memory.candidate_window, 50);
        assert_eq!(config.memory.write_policy, MemoryWritePolicy::BestEffort);
    }
}
