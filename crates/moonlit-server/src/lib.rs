//! Companion backend for moonlit.
//!
//! An axum application exposing:
//!
//! - `POST /api/chat` - wraps the prompt in the persona and relays it to an
//!   Ollama-compatible language model.
//! - `POST /api/tts` - returns base64 PCM from a [`SpeechEngine`]; the built-in
//!   [`SilentSpeech`] engine produces a short silent clip.
//! - `GET /health` - liveness probe.
//! - Everything else - static SPA assets with an `index.html` fallback.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// serde_json is only referenced from test modules and integration tests
use serde_json as _;

// Silence unused dev-dependency warnings
#[cfg(test)]
use http_body_util as _;
#[cfg(test)]
use tempfile as _;
#[cfg(test)]
use tower as _;

pub mod bootstrap;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod llm;
pub mod persona;
pub mod routes;
pub mod speech;
pub mod state;

// Re-export primary types
pub use bootstrap::{build_context, start_server};
pub use config::{CorsConfig, ServerConfig};
pub use error::{HttpError, ServerError};
pub use llm::{LanguageModel, LlmMessage, LlmRole, OllamaClient};
pub use routes::create_router;
pub use speech::{SilentSpeech, SpeechEngine, SynthesizedSpeech};
pub use state::{AppState, ServerContext};
