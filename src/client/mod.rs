//! Chat client: conversation state, transport and the terminal front end.
//!
//! A turn goes: input → user message appended → one `/chat` exchange →
//! assistant reply (or the fallback line) appended.

pub mod conversation;
pub mod error;
pub mod message;
pub mod session;
pub mod terminal;
pub mod transport;

pub use conversation::Conversation;
pub use error::TransportError;
pub use message::{FALLBACK_REPLY, GREETING, Message, Role};
pub use session::{ChatSession, SubmitOutcome};
pub use transport::{ChatTransport, ExchangeReply, HttpTransport};
