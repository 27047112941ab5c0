//! Events observed by the view layer.
//!
//! The view never reads orchestrator or controller fields directly; it
//! subscribes to these through a [`ConversationEventEmitter`](crate::ports::ConversationEventEmitter).
//!
//! # Wire Format
//!
//! Events are serialized with a `type` tag:
//!
//! ```json
//! { "type": "message_removed", "id": 4 }
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::{Message, MessageId, PlaybackSession};

/// Everything a view needs to stay in sync with the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversationEvent {
    /// A message was added to the end of the log.
    MessageAppended { message: Message },

    /// A message changed in place (reply arrived, audio became available).
    MessageUpdated { message: Message },

    /// A message was rolled back out of the log.
    MessageRemoved { id: MessageId },

    /// The submission gate opened or closed.
    SubmittingChanged { is_submitting: bool },

    /// The playback session changed.
    PlaybackChanged { session: PlaybackSession },

    /// A user-facing error was recorded.
    Error { message: String },
}

impl ConversationEvent {
    /// Event name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::MessageAppended { .. } => "message_appended",
            Self::MessageUpdated { .. } => "message_updated",
            Self::MessageRemoved { .. } => "message_removed",
            Self::SubmittingChanged { .. } => "submitting_changed",
            Self::PlaybackChanged { .. } => "playback_changed",
            Self::Error { .. } => "error",
        }
    }
}
