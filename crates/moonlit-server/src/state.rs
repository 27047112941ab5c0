//! Shared application state type.

use std::path::PathBuf;
use std::sync::Arc;

use crate::llm::LanguageModel;
use crate::speech::SpeechEngine;

/// Services and settings needed by the handlers.
pub struct ServerContext {
    pub llm: Arc<dyn LanguageModel>,
    pub speech: Arc<dyn SpeechEngine>,
    /// System instruction prepended to every chat.
    pub persona: String,
    /// Built frontend directory, if any.
    pub static_dir: Option<PathBuf>,
}

/// Application state shared across all handlers.
pub type AppState = Arc<ServerContext>;
