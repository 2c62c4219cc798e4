//! Chat message types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opening assistant line shown before the first exchange.
pub const GREETING: &str =
    "Hello! I'm here to help you with food assistance. How can I assist you today?";

/// Assistant line appended when an exchange fails for any reason.
pub const FALLBACK_REPLY: &str = "I apologize, but I encountered an error. Please try again.";

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Typed by the person using the client.
    User,
    /// Produced by the assistance service (or the client fallback).
    Assistant,
}

impl Role {
    /// String representation used on the wire and in storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single immutable chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    /// Create a message.
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// The assistant greeting.
    #[must_use]
    pub fn greeting() -> Self {
        Self::assistant(GREETING)
    }

    /// The assistant fallback shown after a failed exchange.
    #[must_use]
    pub fn fallback() -> Self {
        Self::assistant(FALLBACK_REPLY)
    }

    /// Who wrote the message.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Message text.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}
