//! Wire types for the chat and speech endpoints.
//!
//! Field names follow the backend's JSON exactly (`snake_case`).

use moonlit_core::ChatTurn;
use moonlit_core::settings::DEFAULT_VOICE_NAME;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub prompt: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

/// Response of `POST /api/chat`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub response: Option<String>,
}

impl ChatResponse {
    /// The reply text, if present and not blank.
    #[must_use]
    pub fn into_reply(self) -> Option<String> {
        self.response.filter(|text| !text.trim().is_empty())
    }
}

/// Body of `POST /api/tts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechRequest {
    pub text: String,
    #[serde(default = "default_voice_name")]
    pub voice_name: String,
}

fn default_voice_name() -> String {
    DEFAULT_VOICE_NAME.to_string()
}

/// Response of `POST /api/tts`.
///
/// `audio_base64` is raw 16-bit little-endian mono PCM, base64 encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechResponse {
    #[serde(default)]
    pub audio_base64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
}
