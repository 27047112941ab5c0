//! Line formats for messages and the playback session.

use moonlit_core::{Message, MessageRole, PlaybackSession, PlaybackState};

/// `[3] moonlit: hello ♪`
pub fn format_message(message: &Message) -> String {
    let speaker = match message.role {
        MessageRole::User => "you",
        MessageRole::Assistant => "moonlit",
        MessageRole::System => "*",
    };
    let audio = if message.has_audio { " ♪" } else { "" };
    format!("[{}] {speaker}: {}{audio}", message.id, message.content)
}

/// One-line summary of the playback session.
pub fn format_session(session: &PlaybackSession) -> String {
    let mut line = format!("playback: {}", session.state.label());
    if let Some(id) = session.active_message_id {
        line.push_str(&format!(" (message {id})"));
    }
    if session.has_resource && session.state != PlaybackState::Playing {
        line.push_str(", audio loaded");
    }
    if let Some(error) = &session.last_error {
        line.push_str(&format!(", last error: {error}"));
    }
    line
}
