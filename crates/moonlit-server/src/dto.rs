//! Request and response bodies of the HTTP API.
//!
//! Response shapes are shared with the client (`moonlit_http::dto`). The chat
//! request is parsed leniently here: history roles are free-form strings.

use serde::{Deserialize, Serialize};

pub use moonlit_http::dto::{ChatResponse, SpeechRequest, SpeechResponse};

/// One history entry as sent by any client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: String,
    pub content: String,
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub prompt: String,
    #[serde(default)]
    pub history: Option<Vec<HistoryEntry>>,
}

/// Body returned when no frontend is available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontendNotice {
    pub message: String,
}
