//! Turns the core's event stream into transcript lines.

use moonlit_core::{ConversationEvent, MessageId, MessageRole, PlaybackSession, PlaybackState};

use super::transcript::format_message;

/// Stateful renderer for [`ConversationEvent`]s.
///
/// Events repeat information (a message is updated again when its audio is
/// built, the session is republished on every transition), so the renderer
/// remembers what it last showed and stays quiet on repeats.
#[derive(Debug, Default)]
pub struct EventRenderer {
    last_playback: Option<(PlaybackState, Option<MessageId>)>,
}

impl EventRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The line to print for `event`, if any.
    pub fn render(&mut self, event: &ConversationEvent) -> Option<String> {
        match event {
            ConversationEvent::MessageAppended { message } => match message.role {
                // The user's own line is already on screen.
                MessageRole::User => None,
                MessageRole::Assistant if message.thinking => {
                    Some(format!("[{}] moonlit is thinking...", message.id))
                }
                _ => Some(format_message(message)),
            },
            ConversationEvent::MessageUpdated { message } => {
                let reply_arrived = message.role == MessageRole::Assistant
                    && !message.thinking
                    && !message.has_audio;
                reply_arrived.then(|| format_message(message))
            }
            ConversationEvent::MessageRemoved { id } => Some(format!("[{id}] (no reply)")),
            ConversationEvent::SubmittingChanged { .. } => None,
            ConversationEvent::PlaybackChanged { session } => self.render_playback(session),
            ConversationEvent::Error { message } => Some(format!("error: {message}")),
        }
    }

    fn render_playback(&mut self, session: &PlaybackSession) -> Option<String> {
        let key = (session.state, session.active_message_id);
        // Each failure is worth a line, even when the state does not move.
        if self.last_playback == Some(key) && session.state != PlaybackState::Errored {
            return None;
        }
        let previous = self.last_playback.replace(key).map(|(state, _)| state);

        let target = session
            .active_message_id
            .map(|id| format!(" message {id}"))
            .unwrap_or_default();
        match session.state {
            PlaybackState::Requesting => Some(format!("♪ preparing audio for{target}")),
            PlaybackState::Ready => None,
            PlaybackState::Playing if previous == Some(PlaybackState::Paused) => {
                Some(format!("♪ resumed{target}"))
            }
            PlaybackState::Playing => Some(format!("♪ playing{target}")),
            PlaybackState::Paused => Some(format!("♪ paused{target}")),
            PlaybackState::Stopped => Some("♪ stopped".to_string()),
            PlaybackState::Idle => matches!(
                previous,
                Some(PlaybackState::Playing | PlaybackState::Paused)
            )
            .then(|| "♪ finished".to_string()),
            PlaybackState::Errored => Some(format!(
                "♪ audio error: {}",
                session.last_error.as_deref().unwrap_or("unknown failure")
            )),
        }
    }
}
