//! Chat session orchestration
//!
//! [`ChatSession`] ties the transcript, the voice state machine, and the
//! response generator together: one instance per open conversation. Reply
//! generation is bounded by a timeout and always produces exactly one
//! assistant message, substituting a fallback apology when the generator
//! fails or times out.

mod transcript;

use std::sync::Arc;
use std::time::Duration;

use crate::responder::ResponseGenerator;
use crate::voice::{ConversationMode, VoiceSession};

pub use transcript::{ChatTranscript, Message, MessageRole};

/// Default bound on a single reply generation
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(30);

/// Assistant greeting shown when a conversation opens
pub const DEFAULT_GREETING: &str = "I'm your AI therapist, here to provide support and \
                                    guidance. What's on your mind today?";

/// Substitute reply when generation fails or times out
pub const DEFAULT_FALLBACK_REPLY: &str = "I'm sorry, I encountered an error processing \
                                          your message. Please try again.";

/// Conversation-level policy
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Upper bound on reply generation before the fallback is used
    pub reply_timeout: Duration,
    /// Opening message, appended as the system preamble
    pub greeting: String,
    /// Assistant message used when generation fails
    pub fallback_reply: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
            greeting: DEFAULT_GREETING.to_string(),
            fallback_reply: DEFAULT_FALLBACK_REPLY.to_string(),
        }
    }
}

/// A single open conversation
///
/// Owns the transcript and the voice session for its lifetime. Sending a
/// message is infallible from the caller's point of view: generator errors
/// and timeouts are absorbed into the fallback reply.
pub struct ChatSession {
    transcript: ChatTranscript,
    voice: VoiceSession,
    responder: Arc<dyn ResponseGenerator>,
    config: ChatConfig,
}

impl ChatSession {
    /// Open a conversation, appending the greeting as the system preamble
    #[must_use]
    pub fn new(
        transcript: ChatTranscript,
        voice: VoiceSession,
        responder: Arc<dyn ResponseGenerator>,
        config: ChatConfig,
    ) -> Self {
        let mut session = Self {
            transcript,
            voice,
            responder,
            config,
        };
        if session.transcript.is_empty() {
            let greeting = session.config.greeting.clone();
            session
                .transcript
                .append(MessageRole::System, greeting, false);
        }
        session
    }

    /// Send a user message and return the assistant's reply
    ///
    /// Appends the user message, generates a reply bounded by the configured
    /// timeout, and appends exactly one assistant message; the fallback reply
    /// stands in when generation fails, times out, or comes back blank. In
    /// voice mode the reply is also read aloud.
    pub async fn send_message(&mut self, text: impl Into<String>) -> Message {
        let is_voice = self.voice.mode() == ConversationMode::Voice;
        self.transcript.append(MessageRole::User, text, is_voice);

        let reply = match tokio::time::timeout(
            self.config.reply_timeout,
            self.responder.generate_reply(self.transcript.all()),
        )
        .await
        {
            Ok(Ok(reply)) if !reply.trim().is_empty() => reply,
            Ok(Ok(_)) => {
                tracing::warn!(responder = self.responder.name(), "empty reply generated");
                self.config.fallback_reply.clone()
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    responder = self.responder.name(),
                    error = %e,
                    "reply generation failed"
                );
                self.config.fallback_reply.clone()
            }
            Err(_) => {
                tracing::warn!(
                    responder = self.responder.name(),
                    timeout_secs = self.config.reply_timeout.as_secs(),
                    "reply generation timed out"
                );
                self.config.fallback_reply.clone()
            }
        };

        let message = self
            .transcript
            .append(MessageRole::Assistant, reply, is_voice);

        if is_voice {
            if let Err(e) = self.voice.speak_text(&message.content).await {
                tracing::warn!(error = %e, "failed to speak reply");
            }
        }

        message
    }

    /// Submit the captured voice transcript as a user message
    ///
    /// Takes the buffered transcript from the voice session and sends it;
    /// returns `None` when the buffer is blank. The session returns to idle
    /// either way.
    pub async fn submit_transcript(&mut self) -> Option<Message> {
        let text = self.voice.take_transcript();
        if text.trim().is_empty() {
            self.voice.finish_processing();
            return None;
        }

        let reply = self.send_message(text).await;
        self.voice.finish_processing();
        Some(reply)
    }

    /// The conversation transcript
    #[must_use]
    pub fn transcript(&self) -> &ChatTranscript {
        &self.transcript
    }

    /// The voice session
    #[must_use]
    pub fn voice(&self) -> &VoiceSession {
        &self.voice
    }

    /// The active configuration
    #[must_use]
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }
}
