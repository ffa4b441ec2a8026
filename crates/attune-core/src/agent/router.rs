//! Intent routing via a low-temperature JSON classification call.

use std::sync::Arc;

use attune_types::llm::{ChatRequest, Message, ResponseFormat};
use attune_types::routing::RoutingDecision;

use crate::decode::decode_or_default;
use crate::llm::box_provider::BoxModelProvider;

const ROUTER_TEMPERATURE: f64 = 0.3;

const ROUTER_SYSTEM_PROMPT: &str = r#"You classify messages sent to an ADHD support assistant. Pick exactly one route:

- "assessment": the user wants to take or retake an ADHD screening
- "planning": help with planning, tasks or coping strategies
- "career": work or career support
- "study": study or academic support
- "history_lookup": the user asks about past screenings, plans or conversations
- "chat": general coaching or questions
- "crisis": self-harm, hopelessness or any sign of crisis (always prefer this when in doubt)

Reply with a JSON object: {"route": string, "confidence": number between 0 and 1, "needed_context": [string]}"#;

/// Classifies a message into a [`Route`](attune_types::routing::Route).
///
/// Routing never fails: unparseable output and provider errors both yield
/// [`RoutingDecision::fallback`].
pub struct IntentRouter {
    provider: Arc<BoxModelProvider>,
    model: String,
}

impl IntentRouter {
    pub fn new(provider: Arc<BoxModelProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    #[tracing::instrument(name = "route_intent", skip(self, message), fields(model = %self.model))]
    pub async fn route(&self, message: &str) -> RoutingDecision {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![Message::system(ROUTER_SYSTEM_PROMPT), Message::user(message)],
            response_format: ResponseFormat::Json,
            temperature: Some(ROUTER_TEMPERATURE),
        };

        let decision = match self.provider.chat(&request).await {
            Ok(response) => {
                decode_or_default(response.structured, &response.text, RoutingDecision::fallback)
                    .normalized()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Intent routing failed; defaulting to chat");
                RoutingDecision::fallback()
            }
        };

        tracing::info!(route = %decision.route, confidence = decision.confidence, "routed message");
        decision
    }
}
