//! `BackendClient`: chat and speech ports over HTTP.

use async_trait::async_trait;
use moonlit_core::{
    BackendError, ChatPort, ChatTurn, ClientSettings, RetryPolicy, SpeechPayload, SpeechPort,
};

use crate::dto::{ChatRequest, ChatResponse, SpeechRequest, SpeechResponse};
use crate::requester::ResilientRequester;
use crate::transport::{HttpTransport, ReqwestTransport, TransportError};

/// Client for the chat and speech endpoints.
///
/// Every call goes through [`ResilientRequester`] with the configured policy.
#[derive(Debug, Clone)]
pub struct BackendClient<T = ReqwestTransport> {
    requester: ResilientRequester<T>,
    chat_url: String,
    tts_url: String,
    voice_name: String,
    policy: RetryPolicy,
}

impl BackendClient<ReqwestTransport> {
    /// Build a client with the production transport.
    pub fn from_settings(settings: &ClientSettings) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::new(settings.request_timeout)?;
        Ok(Self::with_transport(transport, settings))
    }
}

impl<T: HttpTransport> BackendClient<T> {
    /// Build a client over any transport.
    pub fn with_transport(transport: T, settings: &ClientSettings) -> Self {
        Self {
            requester: ResilientRequester::new(transport),
            chat_url: settings.chat_url(),
            tts_url: settings.tts_url(),
            voice_name: settings.voice_name.clone(),
            policy: settings.retry,
        }
    }

    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }

    pub fn tts_url(&self) -> &str {
        &self.tts_url
    }
}

#[async_trait]
impl<T: HttpTransport> ChatPort for BackendClient<T> {
    async fn complete(&self, prompt: &str, history: &[ChatTurn]) -> Result<String, BackendError> {
        let request = ChatRequest {
            prompt: prompt.to_string(),
            history: history.to_vec(),
        };
        tracing::debug!(
            endpoint = %self.chat_url,
            history_len = history.len(),
            "Sending chat request"
        );

        let response: ChatResponse = self
            .requester
            .post_json(&self.chat_url, &request, &self.policy)
            .await?;

        response
            .into_reply()
            .ok_or_else(|| BackendError::EmptyResponse {
                endpoint: self.chat_url.clone(),
                field: "response",
            })
    }
}

#[async_trait]
impl<T: HttpTransport> SpeechPort for BackendClient<T> {
    async fn synthesize(&self, text: &str) -> Result<SpeechPayload, BackendError> {
        let request = SpeechRequest {
            text: text.to_string(),
            voice_name: self.voice_name.clone(),
        };
        tracing::debug!(
            endpoint = %self.tts_url,
            chars = text.chars().count(),
            "Sending speech request"
        );

        let response: SpeechResponse = self
            .requester
            .post_json(&self.tts_url, &request, &self.policy)
            .await?;

        match response.audio_base64 {
            Some(audio_base64) if !audio_base64.is_empty() => Ok(SpeechPayload {
                audio_base64,
                sample_rate: response.sample_rate,
            }),
            _ => Err(BackendError::EmptyResponse {
                endpoint: self.tts_url.clone(),
                field: "audio_base64",
            }),
        }
    }
}
