//! Conversation orchestrator - drives one chat turn from input to speech.
//!
//! ```text
//!   submit(text)
//!     ├─ stop playback
//!     ├─ append user message + assistant placeholder
//!     ├─ ChatPort::complete(prompt, history)        (gated by is_submitting)
//!     │    ├─ ok   → fill placeholder, release gate, spawn PlaybackPort::play
//!     │    └─ err  → remove placeholder, release gate, record error
//!     └─ return
//! ```
//!
//! The orchestrator owns the message log exclusively. Playback state lives in
//! the [`PlaybackPort`] implementation; the orchestrator only forwards intents
//! and marks messages whose audio was built.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::{ChatTurn, Message, MessageId, MessageRole, PlaybackSession};
use crate::error::{BackendError, ConversationError, PlaybackError};
use crate::events::ConversationEvent;
use crate::ports::{ChatPort, ConversationEventEmitter, PlaybackOutcome, PlaybackPort};

/// Mutable state behind the orchestrator's lock.
#[derive(Debug, Default)]
struct ConversationState {
    messages: Vec<Message>,
    next_id: u64,
    is_submitting: bool,
    last_error: Option<String>,
}

impl ConversationState {
    fn allocate_id(&mut self) -> MessageId {
        self.next_id += 1;
        MessageId::new(self.next_id)
    }

    fn find_mut(&mut self, id: MessageId) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| m.id == id)
    }
}

/// Coordinates the chat call, the message log, and the speech trigger.
///
/// Cheap to clone: all fields are shared handles. Clones observe and mutate
/// the same conversation.
#[derive(Clone)]
pub struct ConversationOrchestrator {
    chat: Arc<dyn ChatPort>,
    playback: Arc<dyn PlaybackPort>,
    emitter: Arc<dyn ConversationEventEmitter>,
    state: Arc<Mutex<ConversationState>>,
    auto_speak: bool,
}

impl ConversationOrchestrator {
    /// Create an orchestrator with an empty log.
    pub fn new(
        chat: Arc<dyn ChatPort>,
        playback: Arc<dyn PlaybackPort>,
        emitter: Arc<dyn ConversationEventEmitter>,
    ) -> Self {
        Self {
            chat,
            playback,
            emitter,
            state: Arc::new(Mutex::new(ConversationState::default())),
            auto_speak: true,
        }
    }

    /// Enable or disable speaking replies automatically.
    #[must_use]
    pub const fn with_auto_speak(mut self, auto_speak: bool) -> Self {
        self.auto_speak = auto_speak;
        self
    }

    // ── Submission ─────────────────────────────────────────────────

    /// Send `text` as the next user turn.
    ///
    /// Returns the id of the assistant message holding the reply. On failure
    /// the placeholder is removed, the user message stays, and the error is
    /// recorded as the latest user-facing error.
    pub async fn submit(&self, text: &str) -> Result<MessageId, ConversationError> {
        let prompt = text.trim();
        if prompt.is_empty() {
            return Err(ConversationError::EmptyInput);
        }

        {
            let mut state = self.lock();
            if state.is_submitting {
                tracing::debug!("Submission rejected: another is in flight");
                return Err(ConversationError::AlreadySubmitting);
            }
            state.is_submitting = true;
            state.last_error = None;
        }
        self.emitter.emit(ConversationEvent::SubmittingChanged {
            is_submitting: true,
        });

        // Each turn starts from a clean playback slate.
        self.playback.stop();

        let (assistant_id, history) = self.open_turn(prompt);
        tracing::info!(
            message_id = %assistant_id,
            history_len = history.len(),
            "Sending chat request"
        );

        let result = match self.chat.complete(prompt, &history).await {
            Ok(reply) if reply.trim().is_empty() => Err(BackendError::EmptyResponse {
                endpoint: "chat".to_string(),
                field: "response",
            }),
            other => other,
        };

        match result {
            Ok(reply) => {
                self.complete_turn(assistant_id, &reply);
                if self.auto_speak {
                    self.spawn_speech(assistant_id, reply);
                }
                Ok(assistant_id)
            }
            Err(err) => {
                tracing::error!(message_id = %assistant_id, error = %err, "Chat request failed");
                self.rollback_turn(assistant_id, err.user_message());
                Err(ConversationError::Chat(err))
            }
        }
    }

    /// Append the user message and the placeholder, returning the history
    /// that precedes them.
    fn open_turn(&self, prompt: &str) -> (MessageId, Vec<ChatTurn>) {
        let mut state = self.lock();

        let history: Vec<ChatTurn> = state
            .messages
            .iter()
            .filter(|m| m.is_history_eligible())
            .map(ChatTurn::from)
            .collect();

        let user = Message::user(state.allocate_id(), prompt);
        let placeholder = Message::assistant_placeholder(state.allocate_id());
        let assistant_id = placeholder.id;

        state.messages.push(user.clone());
        state.messages.push(placeholder.clone());
        self.emitter
            .emit(ConversationEvent::MessageAppended { message: user });
        self.emitter.emit(ConversationEvent::MessageAppended {
            message: placeholder,
        });

        (assistant_id, history)
    }

    fn complete_turn(&self, assistant_id: MessageId, reply: &str) {
        let mut state = self.lock();
        if let Some(message) = state.find_mut(assistant_id) {
            message.content = reply.to_string();
            message.thinking = false;
            let updated = message.clone();
            self.emitter
                .emit(ConversationEvent::MessageUpdated { message: updated });
        }
        state.is_submitting = false;
        drop(state);

        self.emitter.emit(ConversationEvent::SubmittingChanged {
            is_submitting: false,
        });
    }

    fn rollback_turn(&self, assistant_id: MessageId, user_message: String) {
        let mut state = self.lock();
        state.messages.retain(|m| m.id != assistant_id);
        state.is_submitting = false;
        state.last_error = Some(user_message.clone());
        drop(state);

        self.emitter
            .emit(ConversationEvent::MessageRemoved { id: assistant_id });
        self.emitter.emit(ConversationEvent::SubmittingChanged {
            is_submitting: false,
        });
        self.emitter.emit(ConversationEvent::Error {
            message: user_message,
        });
    }

    /// Fire-and-forget speech for a confirmed reply.
    fn spawn_speech(&self, id: MessageId, text: String) {
        let this = self.clone();
        tokio::spawn(async move {
            let result = this.playback.play(id, &text).await;
            this.note_playback_result(id, &result);
        });
    }

    // ── Playback intents ───────────────────────────────────────────

    /// Pause/resume the message's audio, or start it if another is active.
    pub async fn toggle_audio(&self, id: MessageId) -> Result<PlaybackOutcome, ConversationError> {
        let text = self.speakable_content(id)?;
        let result = self.playback.toggle(id, &text).await;
        self.note_playback_result(id, &result);
        result.map_err(ConversationError::from)
    }

    /// Synthesize and play the message's audio from the start.
    pub async fn play_audio(&self, id: MessageId) -> Result<PlaybackOutcome, ConversationError> {
        let text = self.speakable_content(id)?;
        let result = self.playback.play(id, &text).await;
        self.note_playback_result(id, &result);
        result.map_err(ConversationError::from)
    }

    /// Halt playback.
    pub fn stop_audio(&self) {
        self.playback.stop();
    }

    fn speakable_content(&self, id: MessageId) -> Result<String, ConversationError> {
        let state = self.lock();
        let message = state
            .messages
            .iter()
            .find(|m| m.id == id)
            .ok_or(ConversationError::UnknownMessage(id))?;
        if message.role != MessageRole::Assistant {
            return Err(ConversationError::NotSpeakable(id));
        }
        if message.thinking {
            return Err(ConversationError::MessagePending(id));
        }
        Ok(message.content.clone())
    }

    fn note_playback_result(&self, id: MessageId, result: &Result<PlaybackOutcome, PlaybackError>) {
        match result {
            Ok(PlaybackOutcome::Started) => self.mark_has_audio(id),
            Ok(outcome) => tracing::debug!(message_id = %id, ?outcome, "Playback intent settled"),
            Err(err) => {
                if err.reached_output() {
                    self.mark_has_audio(id);
                }
                if !err.is_silent() {
                    tracing::warn!(message_id = %id, error = %err, "Speech pipeline failed");
                }
            }
        }
    }

    fn mark_has_audio(&self, id: MessageId) {
        let mut state = self.lock();
        if let Some(message) = state.find_mut(id) {
            if !message.has_audio {
                message.has_audio = true;
                let updated = message.clone();
                self.emitter
                    .emit(ConversationEvent::MessageUpdated { message: updated });
            }
        }
    }

    // ── View helpers ───────────────────────────────────────────────

    /// Append a system notice (e.g. a welcome line). Never sent as history.
    pub fn append_system(&self, text: &str) -> MessageId {
        let mut state = self.lock();
        let message = Message::system(state.allocate_id(), text);
        let id = message.id;
        state.messages.push(message.clone());
        self.emitter
            .emit(ConversationEvent::MessageAppended { message });
        id
    }

    /// Snapshot of the message log.
    pub fn messages(&self) -> Vec<Message> {
        self.lock().messages.clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.lock().is_submitting
    }

    /// Latest user-facing chat error, if any.
    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    pub fn playback_session(&self) -> PlaybackSession {
        self.playback.session()
    }

    fn lock(&self) -> MutexGuard<'_, ConversationState> {
        // State is only mutated in short, panic-free sections.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
