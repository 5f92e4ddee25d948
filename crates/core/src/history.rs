//! Append-only conversation history.

use chrono::Utc;

use crate::message::{ConversationMessage, Message, Role};

/// The ordered log of one conversation's committed messages.
///
/// Sequence numbers are assigned here, so they are strictly increasing by
/// construction. There is no removal or in-place edit; the whole history is
/// sent to the provider on every turn.
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    messages: Vec<ConversationMessage>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return the sequence number it was given.
    pub fn append(&mut self, role: Role, content: impl Into<String>) -> u64 {
        let sequence = self.messages.last().map_or(1, |m| m.sequence + 1);
        self.messages.push(ConversationMessage {
            sequence,
            role,
            content: content.into(),
            timestamp: Utc::now(),
        });
        sequence
    }

    /// All committed messages, oldest first.
    pub fn all(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ConversationMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of committed messages with the given role.
    pub fn count(&self, role: Role) -> usize {
        self.messages.iter().filter(|m| m.role == role).count()
    }

    /// Wire form of the full history.
    pub fn to_messages(&self) -> Vec<Message> {
        self.messages.iter().map(ConversationMessage::to_message).collect()
    }
}
