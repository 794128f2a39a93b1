//! Append-only chat transcript
//!
//! The in-memory conversation record. Messages are immutable once appended
//! and keep insertion order. Persistence to the session store is best-effort:
//! mirror failures are logged and never propagate to the caller.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::SessionRepo;

/// Message author
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "system" => Some(Self::System),
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            _ => None,
        }
    }
}

/// A single chat message, immutable once created
#[derive(Debug, Clone)]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Whether the content was captured via speech recognition
    pub is_voice: bool,
}

impl Message {
    /// Create a message with a fresh id and timestamp
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>, is_voice: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            created_at: Utc::now(),
            is_voice,
        }
    }
}

/// Persistence target for best-effort mirroring
struct Mirror {
    repo: SessionRepo,
    session_id: String,
}

/// Ordered, append-only sequence of messages
///
/// Owned by the chat view for its lifetime. When a mirror is attached, each
/// append is written to the session store fire-and-forget; client-side append
/// order is the only ordering guarantee.
pub struct ChatTranscript {
    messages: Vec<Message>,
    mirror: Option<Mirror>,
}

impl ChatTranscript {
    /// Create an in-memory transcript
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
            mirror: None,
        }
    }

    /// Create a transcript mirrored to the session store
    #[must_use]
    pub fn with_mirror(repo: SessionRepo, session_id: impl Into<String>) -> Self {
        Self {
            messages: Vec::new(),
            mirror: Some(Mirror {
                repo,
                session_id: session_id.into(),
            }),
        }
    }

    /// Append a message, assigning its id and timestamp
    ///
    /// Returns the stored message. Mirroring happens in the background and
    /// never blocks or fails the append.
    pub fn append(
        &mut self,
        role: MessageRole,
        content: impl Into<String>,
        is_voice: bool,
    ) -> Message {
        let message = Message::new(role, content, is_voice);
        self.mirror(&message);
        self.messages.push(message.clone());
        message
    }

    /// Load previously persisted messages without re-mirroring them
    ///
    /// Used to resume a stored session; appended after whatever is already
    /// present (normally just the system preamble).
    pub fn hydrate(&mut self, messages: Vec<Message>) {
        self.messages.extend(messages);
    }

    /// The full ordered message sequence
    #[must_use]
    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    /// Messages excluding the system preamble
    pub fn visible(&self) -> impl Iterator<Item = &Message> {
        self.messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
    }

    /// The most recent message, if any
    #[must_use]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Write a message to the session store, best-effort
    fn mirror(&self, message: &Message) {
        let Some(mirror) = &self.mirror else {
            return;
        };
        let repo = mirror.repo.clone();
        let session_id = mirror.session_id.clone();
        let message = message.clone();
        drop(tokio::task::spawn_blocking(move || {
            if let Err(e) = repo.add_message(&session_id, &message) {
                tracing::warn!(
                    session_id = %session_id,
                    error = %e,
                    "failed to mirror message to session store"
                );
            }
        }));
    }
}

impl Default for ChatTranscript {
    fn default() -> Self {
        Self::new()
    }
}
