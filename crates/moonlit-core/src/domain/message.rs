//! Chat message domain types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Content shown for an assistant message while its reply is pending.
pub const THINKING_PLACEHOLDER: &str = "...";

/// Identifier of a message in the conversation log.
///
/// Assigned monotonically, so comparing two ids compares creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(u64);

impl MessageId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    /// Parse a role from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "system" => Some(Self::System),
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            _ => None,
        }
    }

    /// Convert role to string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One chat turn in the conversation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub role: MessageRole,
    pub content: String,
    /// Set only on an assistant message whose reply has not arrived yet.
    pub thinking: bool,
    /// Set once a container built for this message was handed to the output,
    /// whether or not the output then played it. Speech discarded because a
    /// newer request overtook it does not count.
    pub has_audio: bool,
}

impl Message {
    #[must_use]
    pub fn user(id: MessageId, content: impl Into<String>) -> Self {
        Self {
            id,
            role: MessageRole::User,
            content: content.into(),
            thinking: false,
            has_audio: false,
        }
    }

    #[must_use]
    pub fn system(id: MessageId, content: impl Into<String>) -> Self {
        Self {
            id,
            role: MessageRole::System,
            content: content.into(),
            thinking: false,
            has_audio: false,
        }
    }

    /// An assistant message waiting for its reply.
    #[must_use]
    pub fn assistant_placeholder(id: MessageId) -> Self {
        Self {
            id,
            role: MessageRole::Assistant,
            content: THINKING_PLACEHOLDER.to_string(),
            thinking: true,
            has_audio: false,
        }
    }

    /// Whether this message belongs in the history sent to the chat backend.
    #[must_use]
    pub fn is_history_eligible(&self) -> bool {
        self.role != MessageRole::System && !self.thinking
    }
}

/// Role of a history entry on the wire. The chat backend only knows two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryRole {
    User,
    Assistant,
}

impl From<MessageRole> for HistoryRole {
    fn from(role: MessageRole) -> Self {
        match role {
            MessageRole::User => Self::User,
            MessageRole::Assistant | MessageRole::System => Self::Assistant,
        }
    }
}

/// A prior turn sent along with a chat prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: HistoryRole,
    pub content: String,
}

impl From<&Message> for ChatTurn {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role.into(),
            content: message.content.clone(),
        }
    }
}
