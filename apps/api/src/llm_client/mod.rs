//! LLM client: the single point of entry for completion provider calls.
//!
//! No other module talks to the provider over HTTP. Handlers depend on the
//! `CompletionProvider` trait so the fallback policy can be exercised without
//! a network.
//!
//! The provider speaks the OpenAI chat-completions protocol (Groq by default).
//! Each `complete` call is exactly one HTTP attempt: tier fallback lives in
//! `chat::invoker`, not here.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::chat::classify::FailureStage;

pub mod prompts;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Request timeout: {0}")]
    Timeout(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed provider response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl LlmError {
    /// Transport-level failures are `Network`; anything the provider answered is `Provider`.
    pub fn stage(&self) -> FailureStage {
        match self {
            LlmError::Timeout(_) | LlmError::Http(_) => FailureStage::Network,
            LlmError::Api { .. } | LlmError::Parse(_) => FailureStage::Provider,
        }
    }

    fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout(err.to_string())
        } else {
            LlmError::Http(err)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// The `[system, user]` message pair sent to the provider.
/// Built once per request and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPayload {
    messages: [ChatMessage; 2],
}

impl PromptPayload {
    pub fn new(system: String, user: String) -> Self {
        Self {
            messages: [
                ChatMessage {
                    role: Role::System,
                    content: system,
                },
                ChatMessage {
                    role: Role::User,
                    content: user,
                },
            ],
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn user(&self) -> &str {
        &self.messages[1].content
    }
}

/// One entry in the ordered list of models to try.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelTier {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Raw result of one completion call. `text` is `None` when the provider sent no content.
#[derive(Debug, Clone)]
pub struct CompletionOutput {
    pub text: Option<String>,
    pub model: String,
    pub total_tokens: u32,
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(
        &self,
        tier: &ModelTier,
        prompt: &PromptPayload,
    ) -> Result<CompletionOutput, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    total_tokens: u32,
}

impl ChatCompletionResponse {
    /// Content of the first choice, if any.
    fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ProviderErrorEnvelope {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

/// Stateless after construction; clones share one connection pool.
#[derive(Clone)]
pub struct GroqClient {
    client: Client,
    api_key: String,
    completions_url: String,
}

impl GroqClient {
    pub fn new(api_key: String, base_url: &str, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            completions_url: format!("{}/chat/completions", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl CompletionProvider for GroqClient {
    async fn complete(
        &self,
        tier: &ModelTier,
        prompt: &PromptPayload,
    ) -> Result<CompletionOutput, LlmError> {
        let request_body = ChatCompletionRequest {
            model: &tier.model,
            messages: prompt.messages(),
            max_tokens: tier.max_tokens,
            temperature: tier.temperature,
        };

        let response = self
            .client
            .post(&self.completions_url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(LlmError::from_transport)?;

        let status = response.status();
        let body = response.text().await.map_err(LlmError::from_transport)?;

        if !status.is_success() {
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&body)?;
        let total_tokens = parsed.usage.as_ref().map_or(0, |u| u.total_tokens);

        debug!(
            "Completion from {} succeeded: total_tokens={}",
            tier.model, total_tokens
        );

        Ok(CompletionOutput {
            text: parsed.text().map(str::to_string),
            model: parsed.model.unwrap_or_else(|| tier.model.clone()),
            total_tokens,
        })
    }
}

/// Pulls `error.message` (and `error.code`) out of an error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ProviderErrorEnvelope>(body) {
        Ok(ProviderErrorEnvelope {
            error: ProviderErrorBody {
                message,
                code: Some(code),
            },
        }) => format!("{message} ({code})"),
        Ok(envelope) => envelope.error.message,
        Err(_) => body.to_string(),
    }
}
