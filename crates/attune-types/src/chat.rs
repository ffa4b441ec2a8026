//! Conversation thread types for Attune.
//!
//! A thread is an append-only list of user/assistant turns identified by an
//! opaque id, owned by a single user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Who wrote a message in a conversation thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreadRole {
    User,
    Assistant,
}

impl fmt::Display for ThreadRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThreadRole::User => write!(f, "user"),
            ThreadRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for ThreadRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(ThreadRole::User),
            "assistant" => Ok(ThreadRole::Assistant),
            other => Err(format!("invalid thread role: '{other}'")),
        }
    }
}

/// A single turn within a conversation thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadMessage {
    pub role: ThreadRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ThreadMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ThreadRole::User,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ThreadRole::Assistant,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// A conversation thread with its messages in append order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationThread {
    pub owner_id: String,
    pub thread_id: String,
    pub messages: Vec<ThreadMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
