//! Non-diagnostic explanation of a scored screening.

use std::sync::Arc;

use attune_types::assessment::{Assessment, AssessmentExplanation};
use attune_types::config::ModelConfig;
use attune_types::llm::{ChatRequest, LlmError, Message, ResponseFormat};
use attune_types::profile::Profile;

use crate::decode::decode_or_default;
use crate::llm::box_provider::BoxModelProvider;

/// Totals above this use the escalated (larger) model.
pub const ESCALATION_THRESHOLD: u32 = 12;

const EXPLAINER_TEMPERATURE: f64 = 0.7;

const EXPLAINER_SYSTEM_PROMPT: &str = r#"You explain ADHD screening results in a supportive, non-diagnostic way.

Rules:
- This is a screening tool, not a medical diagnosis; never claim to diagnose
- Use warm, non-judgmental language focused on self-understanding
- Encourage a professional evaluation where the scores suggest it

Reply with a JSON object with these keys:
"interpretation" (string), "traits" (array of strings), "questionsForClinician" (array of strings),
"strategies" (array of strings tailored to the profile), "disclaimer" (string)"#;

pub struct AssessmentExplainer {
    provider: Arc<BoxModelProvider>,
    model: String,
    escalated_model: String,
}

impl AssessmentExplainer {
    pub fn new(provider: Arc<BoxModelProvider>, models: &ModelConfig) -> Self {
        Self {
            provider,
            model: models.explainer.clone(),
            escalated_model: models.explainer_escalated.clone(),
        }
    }

    fn model_for(&self, assessment: &Assessment) -> &str {
        if assessment.scores.total > ESCALATION_THRESHOLD {
            &self.escalated_model
        } else {
            &self.model
        }
    }

    /// Explain `assessment` for its owner.
    ///
    /// Malformed model output yields [`AssessmentExplanation::safe_default`];
    /// only provider failures are returned as errors.
    #[tracing::instrument(
        name = "explain_assessment",
        skip_all,
        fields(kind = %assessment.kind, total = assessment.scores.total)
    )]
    pub async fn explain(
        &self,
        assessment: &Assessment,
        profile: &Profile,
    ) -> Result<AssessmentExplanation, LlmError> {
        let request = ChatRequest {
            model: self.model_for(assessment).to_string(),
            messages: vec![
                Message::system(EXPLAINER_SYSTEM_PROMPT),
                Message::user(user_turn(assessment, profile)?),
            ],
            response_format: ResponseFormat::Json,
            temperature: Some(EXPLAINER_TEMPERATURE),
        };

        let response = self.provider.chat(&request).await?;
        let explanation = decode_or_default(
            response.structured,
            &response.text,
            AssessmentExplanation::safe_default,
        );
        Ok(explanation.filled())
    }
}

fn user_turn(assessment: &Assessment, profile: &Profile) -> Result<String, LlmError> {
    let scores = serde_json::to_string(&assessment.scores)
        .map_err(|e| LlmError::Deserialization(e.to_string()))?;
    let answers = serde_json::to_string(&assessment.answers)
        .map_err(|e| LlmError::Deserialization(e.to_string()))?;

    Ok(format!(
        "Assessment results:\nType: {}\nScores: {scores}\nAnswers: {answers}\n\n\
         User profile:\nGoals: {}\nStruggles: {}\n\n\
         Write a supportive explanation in the requested format.",
        assessment.kind,
        profile.goals_line(),
        profile.struggles_line(),
    ))
}

#[cfg(test)]
mod tests {
    use attune_types::assessment::{Answer, AssessmentKind};
    use attune_types::llm::LlmError;

    use super::*;
    use crate::test_support::MockProvider;

    fn explainer(provider: &MockProvider) -> AssessmentExplainer {
        AssessmentExplainer::new(
            Arc::new(BoxModelProvider::new(provider.clone())),
            &ModelConfig::default(),
        )
    }

    fn assessment(kind: AssessmentKind, values: &[u8]) -> Assessment {
        let answers = values
            .iter()
            .enumerate()
            .map(|(i, v)| Answer::new(format!("q{}", i + 1), *v))
            .collect();
        Assessment::new("u1", kind, answers)
    }

    #[tokio::test]
    async fn test_decodes_camel_case_explanation() {
        let provider = MockProvider::new();
        provider.push_reply(
            r#"{"interpretation":"Several positives.","traits":["time blindness"],
                "questionsForClinician":["Should I get evaluated?"],
                "strategies":["Use timers"],"disclaimer":"Not a diagnosis."}"#,
        );

        let explanation = explainer(&provider)
            .explain(&assessment(AssessmentKind::Asrs6, &[3, 4, 1, 3, 0, 4]), &Profile::empty("u1"))
            .await
            .unwrap();
        assert_eq!(explanation.interpretation, "Several positives.");
        assert_eq!(explanation.questions_for_clinician, vec!["Should I get evaluated?"]);
        assert_eq!(explanation.strategies, vec!["Use timers"]);

        let requests = provider.chat_requests();
        assert_eq!(requests[0].model, "gemini-2.5-flash");
        assert_eq!(requests[0].temperature, Some(0.7));
        assert_eq!(requests[0].response_format, ResponseFormat::Json);
    }

    #[tokio::test]
    async fn test_invalid_json_yields_safe_default() {
        let provider = MockProvider::new();
        provider.push_reply("Here is your explanation: you did great!");

        let explanation = explainer(&provider)
            .explain(&assessment(AssessmentKind::Asrs6, &[0; 6]), &Profile::empty("u1"))
            .await
            .unwrap();
        assert_eq!(explanation, AssessmentExplanation::safe_default());
        assert!(!explanation.disclaimer.is_empty());
        assert!(!explanation.questions_for_clinician.is_empty());
    }

    #[tokio::test]
    async fn test_partial_json_gets_disclaimer_filled() {
        let provider = MockProvider::new();
        provider.push_reply(r#"{"interpretation":"Mixed results."}"#);

        let explanation = explainer(&provider)
            .explain(&assessment(AssessmentKind::Asrs6, &[2; 6]), &Profile::empty("u1"))
            .await
            .unwrap();
        assert_eq!(explanation.interpretation, "Mixed results.");
        assert!(!explanation.disclaimer.is_empty());
    }

    #[tokio::test]
    async fn test_high_total_escalates_model() {
        let provider = MockProvider::new();
        let high = assessment(AssessmentKind::Asrs18, &[4; 18]);
        assert_eq!(high.scores.total, 18);

        explainer(&provider).explain(&high, &Profile::empty("u1")).await.unwrap();
        assert_eq!(provider.chat_requests()[0].model, "gemini-2.5-pro");
    }

    #[tokio::test]
    async fn test_threshold_total_does_not_escalate() {
        let provider = MockProvider::new();
        let mut values = vec![4u8; 12];
        values.extend([0u8; 6]);
        let edge = assessment(AssessmentKind::Asrs18, &values);
        assert_eq!(edge.scores.total, ESCALATION_THRESHOLD);

        explainer(&provider).explain(&edge, &Profile::empty("u1")).await.unwrap();
        assert_eq!(provider.chat_requests()[0].model, "gemini-2.5-flash");
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let provider = MockProvider::new();
        provider.push_error(LlmError::Provider {
            provider: "mock".to_string(),
            status: Some(401),
            latency_ms: 1,
            message: "bad key".to_string(),
        });

        let err = explainer(&provider)
            .explain(&assessment(AssessmentKind::Asrs6, &[1; 6]), &Profile::empty("u1"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(401));
    }
}
