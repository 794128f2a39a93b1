//! HTTP-backed response generator
//!
//! Talks to an OpenAI-compatible chat-completions endpoint. This is the
//! network-bound collaborator the keyword placeholder stands in for.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::ResponseGenerator;
use crate::chat::Message;
use crate::{Error, Result};

/// Remote chat-completions responder
pub struct HttpResponder {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
}

impl HttpResponder {
    /// Create a responder against `base_url` (e.g. `https://api.openai.com`)
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        max_tokens: u32,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key,
            model: model.into(),
            max_tokens,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl ResponseGenerator for HttpResponder {
    async fn generate_reply(&self, context: &[Message]) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: context
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            max_tokens: Some(self.max_tokens),
        };

        let mut builder = self.client.post(self.endpoint()).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            Error::ResponseGeneration(format!("completion request failed: {e}"))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::ResponseGeneration(format!(
                "completion API error: {status} - {body}"
            )));
        }

        let result: ChatCompletionResponse = response.json().await.map_err(|e| {
            Error::ResponseGeneration(format!("failed to parse completion response: {e}"))
        })?;

        result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| Error::ResponseGeneration("empty completion".to_string()))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: String,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}
