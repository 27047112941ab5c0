//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No `reqwest`, `rodio`, or `axum` types in any signature
//! - Intent-based methods (`play`, `toggle`, `stop`), not device details
//! - Every port is `Send + Sync` so it can sit behind an `Arc` across tasks

pub mod audio_output;
pub mod backend;
pub mod event_emitter;
pub mod playback;

pub use audio_output::{AudioHandle, AudioOutput, EndedCallback};
pub use backend::{ChatPort, SpeechPayload, SpeechPort};
pub use event_emitter::{ChannelEmitter, ConversationEventEmitter, NoopEmitter};
pub use playback::{PlaybackOutcome, PlaybackPort};
