//! Line-oriented terminal front end for a [`ChatSession`].

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use super::message::{Message, Role};
use super::session::{ChatSession, SubmitOutcome};
use super::transport::ChatTransport;

/// Title printed when the client starts.
pub const TITLE: &str = "Zero Hunger Assistant";
/// Tagline printed under the title.
pub const TAGLINE: &str = "Your compassionate food assistance guide";
/// Input line that ends the session.
pub const QUIT_COMMAND: &str = "/quit";

const PROMPT: &str = "> ";
const TYPING: &str = "Assistant is typing...\n";
const BUSY: &str = "Please wait for the current reply.\n";

/// Render one message as a transcript line.
#[must_use]
pub fn format_message(message: &Message) -> String {
    let speaker = match message.role() {
        Role::User => "You",
        Role::Assistant => "Assistant",
    };
    format!("{speaker}: {}\n", message.content())
}

/// Run the interactive loop until `/quit` or end of input.
///
/// Prints the header and the conversation so far, then echoes each input
/// line as a `You:` line, submits it and prints the assistant's answer.
///
/// # Errors
/// Returns an error if reading input or writing output fails.
pub async fn run_repl<T, R, W>(
    session: &ChatSession<T>,
    input: R,
    mut output: W,
) -> std::io::Result<()>
where
    T: ChatTransport,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    output
        .write_all(format!("{TITLE}\n{TAGLINE}\n\n").as_bytes())
        .await?;
    for message in session.messages().await {
        output.write_all(format_message(&message).as_bytes()).await?;
    }

    let mut lines = input.lines();
    loop {
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let trimmed = line.trim();
        if trimmed == QUIT_COMMAND {
            break;
        }
        if trimmed.is_empty() {
            continue;
        }

        output
            .write_all(format_message(&Message::user(trimmed)).as_bytes())
            .await?;
        output.write_all(TYPING.as_bytes()).await?;
        output.flush().await?;

        match session.submit(trimmed).await {
            SubmitOutcome::Replied(message) | SubmitOutcome::Failed(message) => {
                output.write_all(format_message(&message).as_bytes()).await?;
            }
            SubmitOutcome::Rejected => output.write_all(BUSY.as_bytes()).await?,
            SubmitOutcome::Ignored => {}
        }
    }

    output.write_all(b"\n").await?;
    output.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::error::TransportError;
    use crate::client::message::FALLBACK_REPLY;
    use crate::client::transport::ExchangeReply;
    use crate::ids::SessionId;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Echoes the message back, failing on the word "boom".
    #[derive(Default)]
    struct EchoTransport {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ChatTransport for EchoTransport {
        async fn exchange(
            &self,
            message: &str,
            _session_id: Option<&SessionId>,
        ) -> Result<ExchangeReply, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if message == "boom" {
                return Err(TransportError::Status(500));
            }
            Ok(ExchangeReply {
                reply: format!("echo: {message}"),
                session_id: SessionId::from_token("s-1"),
            })
        }
    }

    #[test]
    fn test_format_message() {
        assert_eq!(format_message(&Message::user("hi")), "You: hi\n");
        assert_eq!(format_message(&Message::assistant("yo")), "Assistant: yo\n");
    }

    #[tokio::test]
    async fn test_repl_transcript() {
        let session = ChatSession::new(EchoTransport::default());
        let input: &[u8] = b"I need food help\n\n   \nboom\n/quit\nnever sent\n";
        let mut output = Vec::new();

        run_repl(&session, input, &mut output).await.unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.starts_with("Zero Hunger Assistant\nYour compassionate food assistance guide\n"));
        assert!(text.contains("Assistant: Hello! I'm here to help you with food assistance."));
        assert!(text.contains("You: I need food help\nAssistant is typing...\nAssistant: echo: I need food help\n"));
        assert!(text.contains("You: boom\n"));
        assert!(!text.contains("You: \n"));
        assert!(!text.contains("You: /quit"));
        assert!(text.contains(&format!("Assistant: {FALLBACK_REPLY}\n")));
        assert!(!text.contains("never sent"));
        assert_eq!(session.transport().calls.load(Ordering::SeqCst), 2);
        assert_eq!(session.messages().await.len(), 5);
    }

    #[tokio::test]
    async fn test_repl_ends_on_eof() {
        let session = ChatSession::new(EchoTransport::default());
        let input: &[u8] = b"hello";
        let mut output = Vec::new();

        run_repl(&session, input, &mut output).await.unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Assistant: echo: hello\n"));
        assert_eq!(session.session_id().await.map(SessionId::into_string), Some("s-1".to_string()));
    }
}
