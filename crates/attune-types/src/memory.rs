//! Memory types for Attune.
//!
//! A memory is a short text record with an embedding, written after the
//! assistant produces user-facing output and read back as context for later
//! replies. Records are owner-scoped and append-only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// What produced a memory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Assessment,
    Chat,
    Plan,
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceType::Assessment => write!(f, "assessment"),
            SourceType::Chat => write!(f, "chat"),
            SourceType::Plan => write!(f, "plan"),
        }
    }
}

impl FromStr for SourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "assessment" => Ok(SourceType::Assessment),
            "chat" => Ok(SourceType::Chat),
            "plan" => Ok(SourceType::Plan),
            other => Err(format!("invalid memory source type: '{other}'")),
        }
    }
}

/// A single long-term memory belonging to one user.
///
/// `embedding` is optional only because historical rows may have been written
/// without one; retrieval skips such records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub id: Uuid,
    pub owner_id: String,
    pub text: String,
    pub source_type: SourceType,
    /// Identifier of the thread, assessment or plan this memory came from.
    pub source_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    pub created_at: DateTime<Utc>,
}
