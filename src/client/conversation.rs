//! Append-only conversation state held by the chat client.

use crate::ids::SessionId;

use super::message::Message;

/// Ordered messages of one conversation plus the session the service assigned.
///
/// Messages can only be appended. The session id is set at most once.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    session_id: Option<SessionId>,
}

impl Conversation {
    /// Create an empty conversation.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
            session_id: None,
        }
    }

    /// Create a conversation opened by the assistant greeting.
    #[must_use]
    pub fn with_greeting() -> Self {
        let mut conversation = Self::new();
        conversation.append(Message::greeting());
        conversation
    }

    /// Add a message to the end.
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// All messages in chronological order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Most recent message.
    #[must_use]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Number of messages.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether no message has been recorded yet.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Session id assigned by the service, if any.
    #[must_use]
    pub const fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    /// Adopt `id` if no session is held yet.
    ///
    /// Returns `true` when the id was adopted; a held id is never replaced.
    pub fn adopt_session_id(&mut self, id: SessionId) -> bool {
        if self.session_id.is_some() {
            return false;
        }
        self.session_id = Some(id);
        true
    }
}
