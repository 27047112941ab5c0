//! Backend ports: chat completion and speech synthesis.
//!
//! Implemented by `BackendClient` in `moonlit-http`. Both calls go through the
//! resilient requester there; callers here only see the typed outcome.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::ChatTurn;
use crate::error::BackendError;

/// Raw speech payload as returned by the backend.
///
/// Decoding `audio_base64` into samples is the playback pipeline's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechPayload {
    /// Base64 of little-endian signed 16-bit mono PCM.
    pub audio_base64: String,

    /// Rate the samples were encoded at, when the backend reports it.
    pub sample_rate: Option<u32>,
}

/// Chat-completion backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatPort: Send + Sync {
    /// Send a prompt with prior turns and return the assistant's reply.
    ///
    /// An empty reply is an error (`BackendError::EmptyResponse`).
    async fn complete(&self, prompt: &str, history: &[ChatTurn]) -> Result<String, BackendError>;
}

/// Speech-synthesis backend.
#[async_trait]
pub trait SpeechPort: Send + Sync {
    /// Synthesize `text` with the configured voice.
    async fn synthesize(&self, text: &str) -> Result<SpeechPayload, BackendError>;
}
