//! User profile consumed by the response generators.
//!
//! Profiles are written by onboarding, which lives outside this workspace.
//! The core only ever reads them.

use serde::{Deserialize, Serialize};

/// Communication preferences captured during onboarding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub communication_style: Option<String>,
    #[serde(default)]
    pub reduce_overwhelm: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub owner_id: String,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub struggles: Vec<String>,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_study_context: Option<String>,
}

impl Profile {
    /// An empty profile for users who skipped onboarding.
    pub fn empty(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            ..Default::default()
        }
    }

    /// Goals joined for prompt rendering, or "Not specified".
    pub fn goals_line(&self) -> String {
        join_or_unspecified(&self.goals)
    }

    /// Struggles joined for prompt rendering, or "Not specified".
    pub fn struggles_line(&self) -> String {
        join_or_unspecified(&self.struggles)
    }

    pub fn communication_style(&self) -> &str {
        self.preferences
            .communication_style
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("Standard")
    }
}

fn join_or_unspecified(items: &[String]) -> String {
    if items.is_empty() {
        "Not specified".to_string()
    } else {
        items.join(", ")
    }
}
