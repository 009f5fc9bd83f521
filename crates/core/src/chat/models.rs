#![allow(missing_docs)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Typed by the person at the keyboard.
    User,
    /// Produced by the remote responder (or the local fallback).
    Model,
}

impl Role {
    /// Speaker label used in transcripts.
    pub fn speaker(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Model => "Cyber-Santa",
        }
    }
}

/// A single message in the session transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique, increasing within a session.
    pub id: String,
    pub role: Role,
    pub text: String,
    /// Creation time; list order is authoritative, not this.
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(id: impl Into<String>, role: Role, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}
