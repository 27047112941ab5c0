//! Language model port and the Ollama adapter.

use async_trait::async_trait;
use moonlit_core::{BackendError, RetryPolicy};
use moonlit_http::{HttpTransport, ReqwestTransport, ResilientRequester};
use serde::{Deserialize, Serialize};

use crate::config::ServerConfig;
use crate::error::ServerError;

/// Role of a message sent to the language model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmRole {
    System,
    User,
    Assistant,
}

impl LlmRole {
    /// Map a client-supplied history role. Anything but `user` is the assistant.
    pub fn from_history(role: &str) -> Self {
        if role == "user" {
            Self::User
        } else {
            Self::Assistant
        }
    }
}

/// One chat message in upstream format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmMessage {
    pub role: LlmRole,
    pub content: String,
}

impl LlmMessage {
    pub fn new(role: LlmRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// A chat-capable language model.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Run one non-streaming chat completion.
    ///
    /// An empty reply is `BackendError::EmptyResponse`.
    async fn chat(&self, messages: &[LlmMessage]) -> Result<String, BackendError>;

    /// Model name for logging.
    fn model_name(&self) -> &str;
}

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [LlmMessage],
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    #[serde(default)]
    message: Option<OllamaMessage>,
}

#[derive(Deserialize)]
struct OllamaMessage {
    #[serde(default)]
    content: String,
}

/// Client for Ollama's `/api/chat`.
pub struct OllamaClient<T = ReqwestTransport> {
    requester: ResilientRequester<T>,
    chat_url: String,
    model: String,
    policy: RetryPolicy,
}

impl OllamaClient<ReqwestTransport> {
    /// Build a client from the server configuration.
    pub fn from_config(config: &ServerConfig) -> Result<Self, ServerError> {
        let transport = ReqwestTransport::new(config.upstream_timeout)?;
        Ok(Self::with_transport(transport, config))
    }
}

impl<T: HttpTransport> OllamaClient<T> {
    pub fn with_transport(transport: T, config: &ServerConfig) -> Self {
        Self {
            requester: ResilientRequester::new(transport),
            chat_url: config.ollama_chat_url(),
            model: config.ollama_model.clone(),
            policy: config.upstream_retry,
        }
    }
}

#[async_trait]
impl<T: HttpTransport> LanguageModel for OllamaClient<T> {
    async fn chat(&self, messages: &[LlmMessage]) -> Result<String, BackendError> {
        let request = OllamaChatRequest {
            model: &self.model,
            messages,
            stream: false,
        };
        let response: OllamaChatResponse = self
            .requester
            .post_json(&self.chat_url, &request, &self.policy)
            .await?;

        response
            .message
            .map(|m| m.content)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| BackendError::EmptyResponse {
                endpoint: self.chat_url.clone(),
                field: "message.content",
            })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
