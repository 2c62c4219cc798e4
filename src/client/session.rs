//! One chat conversation driven through a transport, one exchange at a time.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;

use crate::ids::SessionId;

use super::conversation::Conversation;
use super::message::Message;
use super::transport::ChatTransport;

/// What happened to a submitted input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The input was empty after trimming; nothing was sent.
    Ignored,
    /// An exchange was already outstanding; nothing was sent.
    Rejected,
    /// The service replied; carries the appended assistant message.
    Replied(Message),
    /// The exchange failed; carries the appended fallback message.
    Failed(Message),
}

/// Releases the single-flight gate when dropped.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(gate: &'a AtomicBool) -> Option<Self> {
        gate.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(gate))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A conversation bound to a transport.
///
/// At most one exchange is outstanding at any time; further submissions are
/// rejected until it resolves. Transport failures never escape: they become
/// the fallback assistant message.
pub struct ChatSession<T> {
    transport: T,
    conversation: Mutex<Conversation>,
    in_flight: AtomicBool,
}

impl<T: ChatTransport> ChatSession<T> {
    /// Start a conversation opened by the assistant greeting.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self::with_conversation(transport, Conversation::with_greeting())
    }

    /// Continue an existing conversation.
    #[must_use]
    pub fn with_conversation(transport: T, conversation: Conversation) -> Self {
        Self {
            transport,
            conversation: Mutex::new(conversation),
            in_flight: AtomicBool::new(false),
        }
    }

    /// The underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Whether an exchange is outstanding.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Copy of the messages exchanged so far.
    pub async fn messages(&self) -> Vec<Message> {
        self.conversation.lock().await.messages().to_vec()
    }

    /// Session id held by the conversation.
    pub async fn session_id(&self) -> Option<SessionId> {
        self.conversation.lock().await.session_id().cloned()
    }

    /// Submit user input and wait for the exchange to resolve.
    pub async fn submit(&self, input: &str) -> SubmitOutcome {
        let text = input.trim();
        if text.is_empty() {
            return SubmitOutcome::Ignored;
        }

        let Some(_gate) = InFlight::acquire(&self.in_flight) else {
            tracing::debug!("submission rejected: exchange already in flight");
            return SubmitOutcome::Rejected;
        };

        let session_id = {
            let mut conversation = self.conversation.lock().await;
            conversation.append(Message::user(text));
            conversation.session_id().cloned()
        };

        let result = self.transport.exchange(text, session_id.as_ref()).await;

        match result {
            Ok(reply) => {
                let message = Message::assistant(reply.reply);
                let mut conversation = self.conversation.lock().await;
                if let Some(id) = reply.session_id
                    && conversation.adopt_session_id(id)
                {
                    tracing::info!(session_id = ?conversation.session_id(), "session assigned by service");
                }
                conversation.append(message.clone());
                drop(conversation);
                SubmitOutcome::Replied(message)
            }
            Err(err) => {
                tracing::warn!(error = %err, "chat exchange failed");
                let message = Message::fallback();
                self.conversation.lock().await.append(message.clone());
                SubmitOutcome::Failed(message)
            }
        }
    }
}
