//! Intent routing types.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// The classified intent of a user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Assessment,
    Planning,
    Career,
    Study,
    HistoryLookup,
    Chat,
    Crisis,
}

impl Route {
    pub const ALL: [Route; 7] = [
        Route::Assessment,
        Route::Planning,
        Route::Career,
        Route::Study,
        Route::HistoryLookup,
        Route::Chat,
        Route::Crisis,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Assessment => "assessment",
            Route::Planning => "planning",
            Route::Career => "career",
            Route::Study => "study",
            Route::HistoryLookup => "history_lookup",
            Route::Chat => "chat",
            Route::Crisis => "crisis",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Route::ALL
            .into_iter()
            .find(|r| r.as_str() == lower)
            .ok_or_else(|| format!("invalid route: '{s}'"))
    }
}

fn default_confidence() -> f64 {
    0.5
}

/// Output of the intent router. Ephemeral, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub route: Route,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default)]
    pub needed_context: Vec<String>,
}

impl RoutingDecision {
    /// The decision used whenever classification output cannot be trusted.
    pub fn fallback() -> Self {
        Self {
            route: Route::Chat,
            confidence: default_confidence(),
            needed_context: Vec::new(),
        }
    }

    /// Clamp confidence into `[0, 1]`; a non-finite value becomes the fallback confidence.
    pub fn normalized(mut self) -> Self {
        self.confidence = if self.confidence.is_finite() {
            self.confidence.clamp(0.0, 1.0)
        } else {
            default_confidence()
        };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_roundtrip() {
        for route in Route::ALL {
            assert_eq!(route.to_string().parse::<Route>().unwrap(), route);
        }
        assert_eq!("HISTORY_LOOKUP".parse::<Route>().unwrap(), Route::HistoryLookup);
    }

    #[test]
    fn test_decision_deserialize_defaults() {
        let decision: RoutingDecision = serde_json::from_str(r#"{"route":"study"}"#).unwrap();
        assert_eq!(decision.route, Route::Study);
        assert_eq!(decision.confidence, 0.5);
        assert!(decision.needed_context.is_empty());
    }

    #[test]
    fn test_decision_rejects_unknown_route() {
        let result: Result<RoutingDecision, _> = serde_json::from_str(r#"{"route":"shopping"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_normalized_clamps_confidence() {
        let decision = RoutingDecision {
            route: Route::Career,
            confidence: 3.2,
            needed_context: vec![],
        };
        assert_eq!(decision.normalized().confidence, 1.0);

        let decision = RoutingDecision {
            route: Route::Career,
            confidence: f64::NAN,
            needed_context: vec![],
        };
        assert_eq!(decision.normalized().confidence, 0.5);
    }

    #[test]
    fn test_fallback_is_chat() {
        let fallback = RoutingDecision::fallback();
        assert_eq!(fallback.route, Route::Chat);
        assert_eq!(fallback.confidence, 0.5);
        assert!(fallback.needed_context.is_empty());
    }
}
