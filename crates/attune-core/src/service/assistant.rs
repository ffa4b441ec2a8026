//! Assistant service: the entry point request handlers call.
//!
//! Orchestrates crisis screening, intent routing, coaching, screening
//! explanation, thread persistence and memory write-back.

use std::sync::Arc;

use attune_types::assessment::{Answer, Assessment, AssessmentExplanation, AssessmentKind};
use attune_types::chat::{ConversationThread, ThreadMessage};
use attune_types::config::{GlobalConfig, MemoryWritePolicy};
use attune_types::error::RepositoryError;
use attune_types::llm::LlmError;
use attune_types::memory::SourceType;
use attune_types::profile::Profile;
use attune_types::routing::Route;
use serde::Serialize;
use uuid::Uuid;

use crate::agent::AgentError;
use crate::agent::assessment::AssessmentExplainer;
use crate::agent::coach::CoachAgent;
use crate::agent::crisis::{CRISIS_RESPONSE, is_crisis};
use crate::agent::router::IntentRouter;
use crate::chat::repository::ThreadRepository;
use crate::decode::preview;
use crate::llm::box_provider::BoxModelProvider;
use crate::memory::MemoryError;
use crate::memory::service::MemoryService;
use crate::memory::store::MemoryRepository;
use crate::repository::assessment::AssessmentRepository;
use crate::repository::profile::ProfileRepository;

const CHAT_MEMORY_PREVIEW_CHARS: usize = 100;
const ASSESSMENT_MEMORY_PREVIEW_CHARS: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Memory(#[from] MemoryError),
}

impl From<AgentError> for AssistantError {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::Llm(e) => AssistantError::Llm(e),
            AgentError::Memory(e) => AssistantError::Memory(e),
        }
    }
}

/// Reply to one inbound message.
#[derive(Debug, Clone, Serialize)]
pub struct MessageReply {
    pub text: String,
    pub is_crisis: bool,
    pub route: Route,
    /// `None` only for keyword-detected crises, which are never persisted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    /// Set when the memory write-back failed under the best-effort policy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_write_error: Option<String>,
}

/// A persisted screening together with the explanation shown to the user.
#[derive(Debug, Clone, Serialize)]
pub struct SubmittedAssessment {
    pub id: Uuid,
    pub assessment: Assessment,
    pub explanation: AssessmentExplanation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_write_error: Option<String>,
}

/// Stateless request handler. Share it behind an `Arc`.
pub struct AssistantService<M, T, A, P>
where
    M: MemoryRepository,
    T: ThreadRepository,
    A: AssessmentRepository,
    P: ProfileRepository,
{
    router: IntentRouter,
    coach: CoachAgent<M>,
    explainer: AssessmentExplainer,
    memory: Arc<MemoryService<M>>,
    threads: T,
    assessments: A,
    profiles: P,
    write_policy: MemoryWritePolicy,
}

impl<M, T, A, P> AssistantService<M, T, A, P>
where
    M: MemoryRepository,
    T: ThreadRepository,
    A: AssessmentRepository,
    P: ProfileRepository,
{
    /// Wire the agents from `config`. `chat_provider` serves the router, coach
    /// and explainer; `memory` carries its own embedding/rerank provider.
    pub fn new(
        chat_provider: Arc<BoxModelProvider>,
        memory: Arc<MemoryService<M>>,
        threads: T,
        assessments: A,
        profiles: P,
        config: &GlobalConfig,
    ) -> Self {
        let models = &config.models;
        Self {
            router: IntentRouter::new(Arc::clone(&chat_provider), models.router.clone()),
            coach: CoachAgent::new(
                Arc::clone(&chat_provider),
                Arc::clone(&memory),
                models.coach.clone(),
                config.memory.coach_limit,
            ),
            explainer: AssessmentExplainer::new(chat_provider, models),
            memory,
            threads,
            assessments,
            profiles,
            write_policy: config.memory.write_policy,
        }
    }

    /// The owner's profile, or an empty one if they skipped onboarding.
    pub async fn profile(&self, owner_id: &str) -> Result<Profile, AssistantError> {
        Ok(self
            .profiles
            .get(owner_id)
            .await?
            .unwrap_or_else(|| Profile::empty(owner_id)))
    }

    /// Answer one user message.
    ///
    /// A crisis keyword short-circuits everything: no model call, no thread
    /// append, no memory write.
    #[tracing::instrument(name = "handle_message", skip(self, message))]
    pub async fn handle_message(
        &self,
        owner_id: &str,
        message: &str,
        thread_id: Option<String>,
    ) -> Result<MessageReply, AssistantError> {
        if is_crisis(message) {
            tracing::warn!("crisis keywords detected; returning crisis resources");
            return Ok(MessageReply {
                text: CRISIS_RESPONSE.to_string(),
                is_crisis: true,
                route: Route::Crisis,
                thread_id: None,
                memory_write_error: None,
            });
        }

        let decision = self.router.route(message).await;
        let profile = self.profile(owner_id).await?;

        let is_crisis = decision.route == Route::Crisis;
        let text = if is_crisis {
            CRISIS_RESPONSE.to_string()
        } else {
            self.coach.respond(owner_id, message, &profile).await?
        };

        let thread_id = thread_id.unwrap_or_else(|| format!("thread-{}", Uuid::now_v7()));
        self.threads
            .append(
                owner_id,
                &thread_id,
                &[ThreadMessage::user(message), ThreadMessage::assistant(text.as_str())],
            )
            .await?;

        let memory_text = format!(
            "Chat: {}... Response: {}...",
            preview(message, CHAT_MEMORY_PREVIEW_CHARS),
            preview(&text, CHAT_MEMORY_PREVIEW_CHARS),
        );
        let memory_write_error = self
            .remember(owner_id, &memory_text, SourceType::Chat, &thread_id)
            .await?;

        Ok(MessageReply {
            text,
            is_crisis,
            route: decision.route,
            thread_id: Some(thread_id),
            memory_write_error,
        })
    }

    /// Score, explain and persist a screening submission.
    #[tracing::instrument(name = "submit_assessment", skip(self, answers, profile))]
    pub async fn submit_assessment(
        &self,
        owner_id: &str,
        kind: AssessmentKind,
        answers: Vec<Answer>,
        profile: &Profile,
    ) -> Result<SubmittedAssessment, AssistantError> {
        let mut assessment = Assessment::new(owner_id, kind, answers);
        tracing::info!(total = assessment.scores.total, "scored assessment");

        let explanation = self.explainer.explain(&assessment, profile).await?;
        assessment.apply_explanation(&explanation);
        self.assessments.insert(&assessment).await?;

        let memory_text = format!(
            "Assessment ({kind}): Score {}. {}",
            assessment.scores.total,
            preview(&explanation.interpretation, ASSESSMENT_MEMORY_PREVIEW_CHARS),
        );
        let memory_write_error = self
            .remember(
                owner_id,
                &memory_text,
                SourceType::Assessment,
                &assessment.id.to_string(),
            )
            .await?;

        Ok(SubmittedAssessment {
            id: assessment.id,
            assessment,
            explanation,
            memory_write_error,
        })
    }

    /// Owner-scoped lookup; another owner's id reads as `None`.
    pub async fn get_assessment(
        &self,
        owner_id: &str,
        id: &Uuid,
    ) -> Result<Option<Assessment>, AssistantError> {
        Ok(self.assessments.get(owner_id, id).await?)
    }

    pub async fn thread(
        &self,
        owner_id: &str,
        thread_id: &str,
    ) -> Result<Option<ConversationThread>, AssistantError> {
        Ok(self.threads.get_thread(owner_id, thread_id).await?)
    }

    /// Write a memory, applying the configured failure policy.
    ///
    /// Returns the failure message when it was swallowed under
    /// [`MemoryWritePolicy::BestEffort`].
    async fn remember(
        &self,
        owner_id: &str,
        text: &str,
        source_type: SourceType,
        source_id: &str,
    ) -> Result<Option<String>, AssistantError> {
        match self.memory.store(owner_id, text, source_type, source_id).await {
            Ok(_) => Ok(None),
            Err(e) => match self.write_policy {
                MemoryWritePolicy::Strict => Err(e.into()),
                MemoryWritePolicy::BestEffort => {
                    tracing::warn!(error = %e, %source_type, "memory write-back failed; continuing");
                    Ok(Some(e.to_string()))
                }
            },
        }
    }
}
