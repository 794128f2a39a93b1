//! Response generation
//!
//! The collaborator that maps the conversation so far to a reply. In a real
//! deployment this is a network-bound language-model service
//! ([`HttpResponder`]); [`KeywordResponder`] is the offline placeholder.
//! Callers are expected to bound every call with a timeout and substitute a
//! fallback reply on failure; the chat session does both.

mod http;
mod keyword;

use async_trait::async_trait;

use crate::Result;
use crate::chat::Message;

pub use http::HttpResponder;
pub use keyword::KeywordResponder;

/// Generates a reply to the latest user message
///
/// May take an unbounded amount of time; callers own the timeout policy.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    /// Produce a reply given the conversation so far
    ///
    /// The context is the full ordered transcript, system preamble included;
    /// the last user message is the one being answered.
    ///
    /// # Errors
    ///
    /// Returns error if reply generation fails
    async fn generate_reply(&self, context: &[Message]) -> Result<String>;

    /// Short identifier for logging
    fn name(&self) -> &'static str;
}
