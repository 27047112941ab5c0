//! Event emitter trait for pushing state changes to the view layer.
//!
//! Implementations handle transport details (channels, websockets, etc.).

use tokio::sync::mpsc;

use crate::events::ConversationEvent;

/// Trait for emitting conversation events.
///
/// # Implementations
///
/// - [`NoopEmitter`] - For tests and headless contexts
/// - [`ChannelEmitter`] - Unbounded channel consumed by a render task
pub trait ConversationEventEmitter: Send + Sync {
    /// Emit an event. Must not block.
    fn emit(&self, event: ConversationEvent);
}

/// A no-op event emitter.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEmitter;

impl NoopEmitter {
    pub const fn new() -> Self {
        Self
    }
}

impl ConversationEventEmitter for NoopEmitter {
    fn emit(&self, _event: ConversationEvent) {}
}

/// Emitter backed by an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelEmitter {
    tx: mpsc::UnboundedSender<ConversationEvent>,
}

impl ChannelEmitter {
    /// Create the emitter and the receiver the view should drain.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ConversationEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ConversationEventEmitter for ChannelEmitter {
    fn emit(&self, event: ConversationEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("Conversation event dropped: receiver closed");
        }
    }
}
