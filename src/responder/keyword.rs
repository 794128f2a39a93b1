//! Keyword-matching placeholder responder

use std::time::Duration;

use async_trait::async_trait;

use super::ResponseGenerator;
use crate::chat::{Message, MessageRole};
use crate::{Error, Result};

/// A keyword rule: if any trigger matches, the reply is used
struct Rule {
    triggers: &'static [&'static str],
    reply: &'static str,
}

const RULES: &[Rule] = &[
    Rule {
        triggers: &["anxious", "anxiety", "worried"],
        reply: "It sounds like you're experiencing anxiety. This is a common emotion that \
                many people face. Let's explore what triggers these feelings for you. Have \
                you noticed any patterns or specific situations that tend to increase your \
                anxiety? Sometimes, practicing deep breathing or grounding techniques can \
                help in the moment. Would you like to try a brief breathing exercise \
                together?",
    },
    Rule {
        triggers: &["depress", "sad", "hopeless"],
        reply: "I'm hearing that you're feeling low right now. Depression can make \
                everything feel more difficult and draining. Remember that your feelings \
                are valid, and it's okay to not be okay sometimes. Can you tell me more \
                about what you've been experiencing lately? Are there any small activities \
                that have brought you even a tiny bit of relief or joy recently?",
    },
    Rule {
        triggers: &["sleep", "tired", "insomnia"],
        reply: "Sleep difficulties can significantly impact your mental health and daily \
                functioning. Have you noticed any changes in your sleep patterns recently? \
                Sometimes establishing a calming bedtime routine can help signal to your \
                body that it's time to rest. Would you like to discuss specific strategies \
                that might help improve your sleep quality?",
    },
    Rule {
        triggers: &["relationship", "partner", "family", "friend"],
        reply: "Relationships can bring both joy and challenges into our lives. It sounds \
                like you're navigating some relationship dynamics right now. Can you tell \
                me more about the specific situation? Understanding your needs and \
                boundaries in relationships is important, as is effective communication.",
    },
    Rule {
        triggers: &["work", "stress", "overwhelm"],
        reply: "It sounds like you're experiencing stress related to your work or \
                responsibilities. Many people struggle with finding balance and managing \
                the pressures of their daily obligations. Let's think about what aspects \
                feel most overwhelming right now. Are there any small steps you could take \
                to create more structure or boundaries?",
    },
    Rule {
        triggers: &["happy", "good", "better", "grateful"],
        reply: "I'm so glad to hear you're experiencing positive emotions! Recognizing and \
                savoring these good moments is actually a powerful practice for building \
                resilience. What do you think contributed to these positive feelings? \
                Would you like to explore ways to build on this positive momentum?",
    },
];

const DEFAULT_REPLY: &str = "Thank you for sharing that with me. I appreciate your \
                             openness. Can you tell me more about how this has been \
                             affecting you? Understanding your experiences better will \
                             help us explore useful strategies or perspectives together.";

/// Offline responder that matches keywords in the latest user message
///
/// A stand-in for the real language-model service, with an optional
/// simulated latency to mimic a network round trip.
pub struct KeywordResponder {
    delay: Duration,
}

impl KeywordResponder {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            delay: Duration::ZERO,
        }
    }

    /// Add a simulated response latency
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn reply_for(content: &str) -> &'static str {
        let lowered = content.to_lowercase();
        RULES
            .iter()
            .find(|rule| rule.triggers.iter().any(|t| lowered.contains(t)))
            .map_or(DEFAULT_REPLY, |rule| rule.reply)
    }
}

impl Default for KeywordResponder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResponseGenerator for KeywordResponder {
    async fn generate_reply(&self, context: &[Message]) -> Result<String> {
        let last_user = context
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .ok_or_else(|| {
                Error::ResponseGeneration("no user message to reply to".to_string())
            })?;

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        Ok(Self::reply_for(&last_user.content).to_string())
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_anxiety_keywords() {
        let reply = KeywordResponder::reply_for("I'm feeling anxious about work");
        assert!(reply.contains("anxiety"));
    }

    #[test]
    fn falls_back_to_default_reply() {
        let reply = KeywordResponder::reply_for("the weather is weird today");
        assert!(reply.contains("Thank you for sharing"));
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(
            KeywordResponder::reply_for("SLEEP has been rough"),
            KeywordResponder::reply_for("sleep has been rough"),
        );
    }

    #[tokio::test]
    async fn replies_to_latest_user_message() {
        let responder = KeywordResponder::new();
        let context = vec![
            Message::new(MessageRole::System, "preamble", false),
            Message::new(MessageRole::User, "I can't sleep", false),
            Message::new(MessageRole::Assistant, "tell me more", false),
            Message::new(MessageRole::User, "I'm grateful for today", false),
        ];

        let reply = responder.generate_reply(&context).await.unwrap();
        assert!(reply.contains("positive"));
    }

    #[tokio::test]
    async fn errors_without_user_message() {
        let responder = KeywordResponder::new();
        let context = vec![Message::new(MessageRole::System, "preamble", false)];
        assert!(responder.generate_reply(&context).await.is_err());
    }
}
