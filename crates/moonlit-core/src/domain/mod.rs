//! Domain types for moonlit.
//!
//! These types represent the conversation log and the playback session,
//! independent of any transport or audio device.

pub mod message;
pub mod session;

pub use message::{ChatTurn, HistoryRole, Message, MessageId, MessageRole, THINKING_PLACEHOLDER};
pub use session::{PlaybackSession, PlaybackState};
