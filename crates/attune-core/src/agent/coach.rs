//! Coaching replies grounded in the user's profile and past memories.

use std::sync::Arc;

use attune_types::llm::{ChatRequest, Message, ResponseFormat};
use attune_types::memory::MemoryRecord;
use attune_types::profile::Profile;

use super::AgentError;
use crate::llm::box_provider::BoxModelProvider;
use crate::memory::service::MemoryService;
use crate::memory::store::MemoryRepository;

const COACH_TEMPERATURE: f64 = 0.8;

const COACH_GUIDELINES: &str = "You are a supportive ADHD coach giving personalised guidance.

Guidelines:
- Be empathetic and never judgmental
- Keep paragraphs short and clear
- Give practical, actionable suggestions
- Draw on past conversations when they are relevant
- Encourage self-compassion
- Never diagnose or recommend treatment
- If the user mentions crisis or self-harm, point them to crisis resources";

/// Free-text coaching agent.
pub struct CoachAgent<M: MemoryRepository> {
    provider: Arc<BoxModelProvider>,
    memory: Arc<MemoryService<M>>,
    model: String,
    memory_limit: usize,
}

impl<M: MemoryRepository> CoachAgent<M> {
    pub fn new(
        provider: Arc<BoxModelProvider>,
        memory: Arc<MemoryService<M>>,
        model: impl Into<String>,
        memory_limit: usize,
    ) -> Self {
        Self {
            provider,
            memory,
            model: model.into(),
            memory_limit,
        }
    }

    /// Produce a reply to `message`, returned verbatim from the model.
    #[tracing::instrument(name = "coach_respond", skip(self, message, profile), fields(model = %self.model))]
    pub async fn respond(
        &self,
        owner_id: &str,
        message: &str,
        profile: &Profile,
    ) -> Result<String, AgentError> {
        let memories = self
            .memory
            .retrieve(owner_id, message, self.memory_limit)
            .await?;
        tracing::debug!(memories = memories.len(), "loaded coaching context");

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message::system(system_instruction(profile)),
                Message::user(user_turn(message, &memories)),
            ],
            response_format: ResponseFormat::Text,
            temperature: Some(COACH_TEMPERATURE),
        };

        let response = self.provider.chat(&request).await?;
        Ok(response.text)
    }
}

fn system_instruction(profile: &Profile) -> String {
    format!(
        "{COACH_GUIDELINES}\n\nUser Profile:\nGoals: {}\nStruggles: {}\nCommunication Style: {}",
        profile.goals_line(),
        profile.struggles_line(),
        profile.communication_style(),
    )
}

fn user_turn(message: &str, memories: &[MemoryRecord]) -> String {
    if memories.is_empty() {
        return message.to_string();
    }
    let context: Vec<String> = memories.iter().map(|m| format!("- {}", m.text)).collect();
    format!("{message}\n\nRelevant past context:\n{}", context.join("\n"))
}

#[cfg(test)]
mod tests {
    use attune_types::config::{MemoryConfig, ModelConfig};
    use attune_types::memory::SourceType;
    use attune_types::profile::Preferences;

    use super::*;
    use crate::test_support::{InMemoryMemoryRepository, MockProvider};

    fn coach(provider: &MockProvider, repo: InMemoryMemoryRepository) -> CoachAgent<InMemoryMemoryRepository> {
        let boxed = Arc::new(BoxModelProvider::new(provider.clone()));
        let memory = Arc::new(MemoryService::new(
            repo,
            Arc::clone(&boxed),
            &ModelConfig::default(),
            &MemoryConfig::default(),
        ));
        CoachAgent::new(boxed, memory, "gemini-2.5-flash", 5)
    }

    #[tokio::test]
    async fn test_reply_is_returned_verbatim() {
        let provider = MockProvider::new();
        provider.push_reply("  Try a 10 minute timer.  ");
        let agent = coach(&provider, InMemoryMemoryRepository::default());

        let reply = agent.respond("u1", "I can't start", &Profile::empty("u1")).await.unwrap();
        assert_eq!(reply, "  Try a 10 minute timer.  ");

        let requests = provider.chat_requests();
        let request = &requests[0];
        assert_eq!(request.temperature, Some(0.8));
        assert_eq!(request.response_format, ResponseFormat::Text);
        let system = request.system_instruction().unwrap();
        assert!(system.contains("Goals: Not specified"));
        assert!(system.contains("Communication Style: Standard"));
        assert_eq!(request.turns().next().unwrap().content, "I can't start");
    }

    #[tokio::test]
    async fn test_profile_and_memories_reach_the_prompt() {
        let provider = MockProvider::new();
        let repo = InMemoryMemoryRepository::default();
        let agent = coach(&provider, repo.clone());
        agent
            .memory
            .store("u1", "Prefers morning focus blocks", SourceType::Chat, "thread-1")
            .await
            .unwrap();

        let profile = Profile {
            owner_id: "u1".to_string(),
            goals: vec!["finish thesis".to_string(), "exercise".to_string()],
            struggles: vec!["procrastination".to_string()],
            preferences: Preferences {
                communication_style: Some("direct".to_string()),
                reduce_overwhelm: true,
            },
            work_study_context: None,
        };
        agent.respond("u1", "plan tomorrow", &profile).await.unwrap();

        let request = provider.chat_requests().pop().unwrap();
        let system = request.system_instruction().unwrap();
        assert!(system.contains("Goals: finish thesis, exercise"));
        assert!(system.contains("Struggles: procrastination"));
        assert!(system.contains("Communication Style: direct"));

        let user = &request.turns().next().unwrap().content;
        assert!(user.starts_with("plan tomorrow"));
        assert!(user.contains("Relevant past context:\n- Prefers morning focus blocks"));
    }

    #[test]
    fn test_user_turn_without_memories_is_message_only() {
        assert_eq!(user_turn("hello", &[]), "hello");
    }
}
