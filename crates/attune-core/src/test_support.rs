//! Hand-written mocks shared by the attune-core unit tests.
//!
//! Every mock is `Clone` over shared state so a test can keep a handle after
//! moving a copy into the service under test.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use attune_types::assessment::Assessment;
use attune_types::chat::{ConversationThread, ThreadMessage};
use attune_types::error::RepositoryError;
use attune_types::llm::{
    ChatRequest, ChatResponse, EmbedRequest, LlmError, ProviderCapabilities, RerankRequest,
};
use attune_types::memory::MemoryRecord;
use attune_types::profile::Profile;
use chrono::Utc;
use uuid::Uuid;

use crate::chat::repository::ThreadRepository;
use crate::llm::provider::ModelProvider;
use crate::memory::store::MemoryRepository;
use crate::repository::assessment::AssessmentRepository;
use crate::repository::profile::ProfileRepository;

const DEFAULT_EMBEDDING: [f32; 2] = [1.0, 0.0];

#[derive(Default)]
struct MockState {
    chat_replies: Mutex<VecDeque<Result<String, LlmError>>>,
    chat_requests: Mutex<Vec<ChatRequest>>,
    embeddings: Mutex<HashMap<String, Vec<f32>>>,
    embed_fail: AtomicBool,
    embed_calls: AtomicUsize,
    rerank_order: Mutex<Option<Vec<usize>>>,
    rerank_requests: Mutex<Vec<RerankRequest>>,
}

/// Scripted model provider supporting all three operations.
///
/// Chat replies are served from a queue (default "ok"); embeddings come from
/// a text lookup (default `[1, 0]`); rerank returns a fixed order or identity.
#[derive(Clone)]
pub struct MockProvider {
    state: Arc<MockState>,
    capabilities: ProviderCapabilities,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            state: Arc::new(MockState::default()),
            capabilities: ProviderCapabilities {
                chat: true,
                embed: true,
                rerank: true,
            },
        }
    }

    /// Embed-only backend, like Gemini.
    pub fn without_rerank() -> Self {
        let mut provider = Self::new();
        provider.capabilities.rerank = false;
        provider
    }

    pub fn push_reply(&self, text: impl Into<String>) {
        self.state.chat_replies.lock().unwrap().push_back(Ok(text.into()));
    }

    pub fn push_error(&self, err: LlmError) {
        self.state.chat_replies.lock().unwrap().push_back(Err(err));
    }

    pub fn chat_requests(&self) -> Vec<ChatRequest> {
        self.state.chat_requests.lock().unwrap().clone()
    }

    pub fn set_embedding(&self, text: &str, vector: Vec<f32>) {
        self.state
            .embeddings
            .lock()
            .unwrap()
            .insert(text.to_string(), vector);
    }

    pub fn fail_embeddings(&self) {
        self.state.embed_fail.store(true, Ordering::SeqCst);
    }

    pub fn embed_calls(&self) -> usize {
        self.state.embed_calls.load(Ordering::SeqCst)
    }

    pub fn set_rerank_order(&self, order: Vec<usize>) {
        *self.state.rerank_order.lock().unwrap() = Some(order);
    }

    pub fn rerank_calls(&self) -> usize {
        self.state.rerank_requests.lock().unwrap().len()
    }

    pub fn last_rerank_passages(&self) -> Vec<String> {
        self.state
            .rerank_requests
            .lock()
            .unwrap()
            .last()
            .map(|r| r.passages.clone())
            .unwrap_or_default()
    }
}

impl ModelProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        self.state.chat_requests.lock().unwrap().push(request.clone());
        let next = self.state.chat_replies.lock().unwrap().pop_front();
        let text = next.unwrap_or_else(|| Ok("ok".to_string()))?;
        Ok(ChatResponse::from_text(text, request.response_format))
    }

    async fn embed(&self, request: &EmbedRequest) -> Result<Vec<Vec<f32>>, LlmError> {
        self.state.embed_calls.fetch_add(1, Ordering::SeqCst);
        if self.state.embed_fail.load(Ordering::SeqCst) {
            return Err(LlmError::Provider {
                provider: "mock".to_string(),
                status: Some(503),
                latency_ms: 1,
                message: "embedding backend down".to_string(),
            });
        }
        let table = self.state.embeddings.lock().unwrap();
        Ok(request
            .inputs
            .iter()
            .map(|input| {
                table
                    .get(input)
                    .cloned()
                    .unwrap_or_else(|| DEFAULT_EMBEDDING.to_vec())
            })
            .collect())
    }

    async fn rerank(&self, request: &RerankRequest) -> Result<Vec<usize>, LlmError> {
        if !self.capabilities.rerank {
            return Err(LlmError::Unsupported {
                provider: "mock".to_string(),
                capability: "rerank".to_string(),
            });
        }
        self.state.rerank_requests.lock().unwrap().push(request.clone());
        let order = self.state.rerank_order.lock().unwrap().clone();
        Ok(order.unwrap_or_else(|| (0..request.passages.len()).collect()))
    }
}

#[derive(Clone, Default)]
pub struct InMemoryMemoryRepository {
    records: Arc<Mutex<Vec<MemoryRecord>>>,
    fail_insert: Arc<AtomicBool>,
}

impl InMemoryMemoryRepository {
    pub fn push(&self, record: MemoryRecord) {
        self.records.lock().unwrap().push(record);
    }

    pub fn all(&self) -> Vec<MemoryRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn fail_inserts(&self) {
        self.fail_insert.store(true, Ordering::SeqCst);
    }
}

impl MemoryRepository for InMemoryMemoryRepository {
    async fn insert(&self, record: &MemoryRecord) -> Result<(), RepositoryError> {
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(RepositoryError::Query("disk full".to_string()));
        }
        self.push(record.clone());
        Ok(())
    }

    async fn recent_for_owner(
        &self,
        owner_id: &str,
        limit: u32,
    ) -> Result<Vec<MemoryRecord>, RepositoryError> {
        let mut mine: Vec<MemoryRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        mine.truncate(limit as usize);
        Ok(mine)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryThreadRepository {
    threads: Arc<Mutex<HashMap<(String, String), ConversationThread>>>,
}

impl ThreadRepository for InMemoryThreadRepository {
    async fn append(
        &self,
        owner_id: &str,
        thread_id: &str,
        messages: &[ThreadMessage],
    ) -> Result<(), RepositoryError> {
        let now = Utc::now();
        let mut threads = self.threads.lock().unwrap();
        let thread = threads
            .entry((owner_id.to_string(), thread_id.to_string()))
            .or_insert_with(|| ConversationThread {
                owner_id: owner_id.to_string(),
                thread_id: thread_id.to_string(),
                messages: Vec::new(),
                created_at: now,
                updated_at: now,
            });
        thread.messages.extend_from_slice(messages);
        thread.updated_at = now;
        Ok(())
    }

    async fn get_thread(
        &self,
        owner_id: &str,
        thread_id: &str,
    ) -> Result<Option<ConversationThread>, RepositoryError> {
        Ok(self
            .threads
            .lock()
            .unwrap()
            .get(&(owner_id.to_string(), thread_id.to_string()))
            .cloned())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryAssessmentRepository {
    rows: Arc<Mutex<Vec<Assessment>>>,
}

impl AssessmentRepository for InMemoryAssessmentRepository {
    async fn insert(&self, assessment: &Assessment) -> Result<(), RepositoryError> {
        self.rows.lock().unwrap().push(assessment.clone());
        Ok(())
    }

    async fn get(&self, owner_id: &str, id: &Uuid) -> Result<Option<Assessment>, RepositoryError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == *id && a.owner_id == owner_id)
            .cloned())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryProfileRepository {
    profiles: Arc<Mutex<HashMap<String, Profile>>>,
}

impl InMemoryProfileRepository {
    pub fn put(&self, profile: Profile) {
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.owner_id.clone(), profile);
    }
}

impl ProfileRepository for InMemoryProfileRepository {
    async fn get(&self, owner_id: &str) -> Result<Option<Profile>, RepositoryError> {
        Ok(self.profiles.lock().unwrap().get(owner_id).cloned())
    }
}
