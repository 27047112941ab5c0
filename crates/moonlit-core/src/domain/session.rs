//! Playback session snapshot.
//!
//! The live session (including the owned audio resource handle) belongs to the
//! playback controller. Everyone else sees this read-only snapshot.

use serde::{Deserialize, Serialize};

use super::message::MessageId;

/// State of the single playback session.
///
/// ```text
///   Idle/Stopped/Errored ── play ──▶ Requesting ──▶ Ready ──▶ Playing ⇄ Paused
///            ▲                           │                      │
///            └──────── error ────────────┘      ended ──▶ Idle  │
///            └──────────────────── stop ────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// Nothing requested, or the last clip finished naturally.
    #[default]
    Idle,

    /// Speech synthesis and transcoding are in flight.
    Requesting,

    /// Container built, output about to start.
    Ready,

    /// Audio is audible.
    Playing,

    /// Output paused by the user; resource retained.
    Paused,

    /// Output halted by `stop()`.
    Stopped,

    /// The last request failed; see `last_error`.
    Errored,
}

impl PlaybackState {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Requesting => "requesting",
            Self::Ready => "ready",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
            Self::Errored => "errored",
        }
    }
}

/// Read-only view of the playback session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSession {
    pub state: PlaybackState,
    pub active_message_id: Option<MessageId>,
    pub is_playing: bool,
    /// Whether a decoded audio resource is currently held.
    pub has_resource: bool,
    pub last_error: Option<String>,
    /// Token of the most recent `play()`; stale completions carry older values.
    pub epoch: u64,
}

impl PlaybackSession {
    /// Whether the session is associated with `id`.
    #[must_use]
    pub fn is_active_for(&self, id: MessageId) -> bool {
        self.active_message_id == Some(id)
    }
}
