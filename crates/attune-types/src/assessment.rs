//! Screening assessment types and scoring.
//!
//! Scoring follows the ASRS v1.1 convention: an answer on the 0..=4 scale
//! counts as positive when it is 3 ("often") or 4 ("very often").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Answer value at or above which a screening item counts as positive.
pub const POSITIVE_THRESHOLD: u8 = 3;

/// Number of leading ASRS-18 items that form the inattention subscale.
const ASRS18_INATTENTION_ITEMS: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentKind {
    Asrs6,
    Asrs18,
    Extended,
}

impl fmt::Display for AssessmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssessmentKind::Asrs6 => write!(f, "asrs6"),
            AssessmentKind::Asrs18 => write!(f, "asrs18"),
            AssessmentKind::Extended => write!(f, "extended"),
        }
    }
}

impl FromStr for AssessmentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asrs6" => Ok(AssessmentKind::Asrs6),
            "asrs18" => Ok(AssessmentKind::Asrs18),
            "extended" => Ok(AssessmentKind::Extended),
            other => Err(format!("invalid assessment kind: '{other}'")),
        }
    }
}

/// One answered screening question, kept in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: String,
    pub value: u8,
}

impl Answer {
    pub fn new(question_id: impl Into<String>, value: u8) -> Self {
        Self {
            question_id: question_id.into(),
            value,
        }
    }

    fn is_positive(&self) -> bool {
        self.value >= POSITIVE_THRESHOLD
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub total: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inattention: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hyperactivity: Option<u32>,
}

impl Scores {
    /// Count positive answers. ASRS-18 additionally splits the count into
    /// the inattention (items 1-9) and hyperactivity (items 10-18) subscales.
    pub fn from_answers(kind: AssessmentKind, answers: &[Answer]) -> Self {
        let positives = |items: &[Answer]| items.iter().filter(|a| a.is_positive()).count() as u32;
        let total = positives(answers);

        match kind {
            AssessmentKind::Asrs18 => {
                let split = answers.len().min(ASRS18_INATTENTION_ITEMS);
                let rest_end = answers.len().min(ASRS18_INATTENTION_ITEMS * 2);
                Self {
                    total,
                    inattention: Some(positives(&answers[..split])),
                    hyperactivity: Some(positives(&answers[split..rest_end])),
                }
            }
            AssessmentKind::Asrs6 | AssessmentKind::Extended => Self {
                total,
                inattention: None,
                hyperactivity: None,
            },
        }
    }
}

/// Explanation shown to the user after a screening.
///
/// Every field defaults so that a partially-formed model response still
/// decodes; [`AssessmentExplanation::filled`] then patches empty text fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentExplanation {
    #[serde(default)]
    pub interpretation: String,
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(default)]
    pub questions_for_clinician: Vec<String>,
    #[serde(default)]
    pub strategies: Vec<String>,
    #[serde(default)]
    pub disclaimer: String,
}

impl AssessmentExplanation {
    /// Non-diagnostic explanation used when the model output is unusable.
    pub fn safe_default() -> Self {
        Self {
            interpretation: "Thank you for completing the screening. This tool helps with \
                             self-understanding and is not a medical diagnosis."
                .to_string(),
            traits: Vec::new(),
            questions_for_clinician: vec![
                "What are the next steps for a formal evaluation?".to_string(),
                "What resources are available in my area?".to_string(),
            ],
            strategies: vec![
                "Consider keeping a journal of patterns you notice".to_string(),
                "Explore accommodations that might help".to_string(),
                "Connect with support communities".to_string(),
            ],
            disclaimer: "This screening tool is for self-understanding only and does not \
                         constitute a medical diagnosis. Please consult with a qualified \
                         healthcare professional for evaluation and treatment."
                .to_string(),
        }
    }

    /// Replace blank interpretation or disclaimer with the safe-default text.
    pub fn filled(mut self) -> Self {
        let fallback = Self::safe_default();
        if self.interpretation.trim().is_empty() {
            self.interpretation = fallback.interpretation;
        }
        if self.disclaimer.trim().is_empty() {
            self.disclaimer = fallback.disclaimer;
        }
        self
    }
}

/// A scored screening submission with its explanation fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub id: Uuid,
    pub owner_id: String,
    pub kind: AssessmentKind,
    pub answers: Vec<Answer>,
    pub scores: Scores,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpretation: Option<String>,
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub questions_for_clinician: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Assessment {
    /// Score a fresh submission. Explanation fields start empty.
    pub fn new(owner_id: impl Into<String>, kind: AssessmentKind, answers: Vec<Answer>) -> Self {
        let scores = Scores::from_answers(kind, &answers);
        Self {
            id: Uuid::now_v7(),
            owner_id: owner_id.into(),
            kind,
            answers,
            scores,
            interpretation: None,
            traits: Vec::new(),
            recommendations: Vec::new(),
            questions_for_clinician: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Copy explanation fields onto the stored record.
    pub fn apply_explanation(&mut self, explanation: &AssessmentExplanation) {
        self.interpretation = Some(explanation.interpretation.clone());
        self.traits = explanation.traits.clone();
        self.recommendations = explanation.strategies.clone();
        self.questions_for_clinician = explanation.questions_for_clinician.clone();
    }
}
