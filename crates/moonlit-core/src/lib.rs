//! Core domain types and port definitions for moonlit.
//!
//! This crate holds everything the conversation pipeline needs that is free of
//! infrastructure: the message log model, the playback session snapshot, the
//! retry policy, the error taxonomy, the ports implemented by adapter crates,
//! and the [`ConversationOrchestrator`] service that drives a chat turn.
//!
//! Adapters live elsewhere:
//!
//! - `moonlit-http` implements [`ChatPort`] and [`SpeechPort`] over HTTP.
//! - `moonlit-voice` implements [`PlaybackPort`] and the [`AudioOutput`] port.
//! - `moonlit-cli` wires them together and renders [`ConversationEvent`]s.

#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod error;
pub mod events;
pub mod ports;
pub mod retry;
pub mod services;
pub mod settings;

// Re-export commonly used types for convenience
pub use domain::{
    ChatTurn, HistoryRole, Message, MessageId, MessageRole, PlaybackSession, PlaybackState,
    THINKING_PLACEHOLDER,
};
pub use error::{BackendError, BoxError, ConversationError, OutputError, PlaybackError};
pub use events::ConversationEvent;
pub use ports::{
    AudioHandle, AudioOutput, ChannelEmitter, ChatPort, ConversationEventEmitter, EndedCallback,
    NoopEmitter, PlaybackOutcome, PlaybackPort, SpeechPayload, SpeechPort,
};
pub use retry::{DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_ATTEMPTS, RetryPolicy};
pub use services::ConversationOrchestrator;
pub use settings::{
    ClientSettings, DEFAULT_BACKEND_URL, DEFAULT_FALLBACK_SAMPLE_RATE, SettingsError,
};

// Silence unused dev-dependency warnings; mocks are generated under cfg(test)
#[cfg(test)]
use mockall as _;
