//! Playback port - the intents the orchestrator and the view may issue.
//!
//! Implemented by `PlaybackController` in `moonlit-voice`.

use async_trait::async_trait;

use crate::domain::{MessageId, PlaybackSession};
use crate::error::PlaybackError;

/// What a `play`/`toggle` call ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// Audio for the message is now playing.
    Started,

    /// The message's audio was paused.
    Paused,

    /// The message's audio resumed.
    Resumed,

    /// A newer `play`/`stop` overtook this one; its result was discarded.
    Superseded,

    /// The request arrived while the same message was still loading.
    Ignored,
}

/// Single-session playback intents.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlaybackPort: Send + Sync {
    /// Synthesize and play `text` as the audio of message `id`.
    async fn play(&self, id: MessageId, text: &str) -> Result<PlaybackOutcome, PlaybackError>;

    /// Pause/resume `id` if it is the active message, otherwise play it.
    async fn toggle(&self, id: MessageId, text: &str) -> Result<PlaybackOutcome, PlaybackError>;

    /// Halt output and clear the active message. Idempotent.
    fn stop(&self);

    /// Snapshot of the session.
    fn session(&self) -> PlaybackSession;
}
