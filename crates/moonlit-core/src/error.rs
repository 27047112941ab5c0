//! Error taxonomy for the response pipeline.
//!
//! - [`BackendError`]: anything that went wrong talking to the backend or
//!   interpreting its payload. Only `Network` and `Http` are transient.
//! - [`OutputError`]: the audio output refused or failed to play.
//! - [`PlaybackError`]: union of the two, returned by the playback pipeline.
//! - [`ConversationError`]: rejected or failed `submit` calls.

use thiserror::Error;

use crate::domain::MessageId;

/// Boxed error used to carry transport causes across crate boundaries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors from backend calls and their payloads.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The transport failed before a response arrived (connect, timeout, reset).
    #[error("Network error calling {endpoint}: {source}")]
    Network {
        endpoint: String,
        #[source]
        source: BoxError,
    },

    /// The backend answered with a non-success status.
    #[error("{endpoint} returned HTTP {status}: {body}")]
    Http {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The call succeeded but the expected field was missing or empty.
    #[error("{endpoint} returned an empty `{field}`")]
    EmptyResponse {
        endpoint: String,
        field: &'static str,
    },

    /// The payload could not be decoded (malformed JSON, base64, or PCM).
    #[error("Failed to decode {what}: {reason}")]
    Decode { what: &'static str, reason: String },
}

impl BackendError {
    /// Whether another attempt could succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Http { .. })
    }

    /// HTTP status for `Http` errors.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short message suitable for showing to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Network { .. } => {
                "Could not reach the backend. Check that the server is running.".to_string()
            }
            Self::Http { status, .. } => format!("The backend returned an error (HTTP {status})."),
            Self::EmptyResponse { .. } => "The backend returned an empty reply.".to_string(),
            Self::Decode { what, .. } => format!("The backend sent {what} that could not be read."),
        }
    }
}

/// Rejections and failures reported by an audio output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutputError {
    /// The host refused to start audio until the user interacts.
    #[error("Audio playback was blocked ({reason}). Interact with the app, then press play again.")]
    Policy { reason: String },

    /// Playback was interrupted by our own reset sequence. Not user-facing.
    #[error("Audio playback was interrupted")]
    Aborted,

    /// Any other output failure.
    #[error("Audio playback failed: {reason}")]
    Failed { reason: String },
}

/// Failure of the speech pipeline for one message.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

impl PlaybackError {
    /// Whether the error should be hidden from the user.
    #[must_use]
    pub const fn is_silent(&self) -> bool {
        matches!(self, Self::Output(OutputError::Aborted))
    }

    /// Whether the audio container had been built before the failure.
    #[must_use]
    pub const fn reached_output(&self) -> bool {
        matches!(self, Self::Output(_))
    }

    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Backend(err) => format!("Speech failed: {}", err.user_message()),
            Self::Output(err) => err.to_string(),
        }
    }
}

/// Errors returned by the conversation orchestrator.
#[derive(Debug, Error)]
pub enum ConversationError {
    /// The input was empty or whitespace only.
    #[error("Nothing to send")]
    EmptyInput,

    /// A previous submission is still waiting for its reply.
    #[error("A message is already being sent")]
    AlreadySubmitting,

    /// The chat call failed; the placeholder was rolled back.
    #[error(transparent)]
    Chat(#[from] BackendError),

    /// The referenced message is not in the log.
    #[error("No message with id {0}")]
    UnknownMessage(MessageId),

    /// The referenced message has no content to speak yet.
    #[error("Message {0} is still waiting for its reply")]
    MessagePending(MessageId),

    /// Only assistant replies are spoken.
    #[error("Message {0} is not a reply and cannot be spoken")]
    NotSpeakable(MessageId),

    /// A playback intent failed.
    #[error(transparent)]
    Playback(#[from] PlaybackError),
}

impl ConversationError {
    /// Whether the call was refused without touching the log.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::EmptyInput | Self::AlreadySubmitting)
    }

    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Chat(err) => err.user_message(),
            Self::Playback(err) => err.user_message(),
            other => other.to_string(),
        }
    }
}
