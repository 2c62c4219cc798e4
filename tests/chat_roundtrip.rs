use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::routing::post;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use zero_hunger_assistant::client::{
    ChatSession, FALLBACK_REPLY, HttpTransport, Message, SubmitOutcome,
};
use zero_hunger_assistant::config::{ClientConfig, ServerConfig};
use zero_hunger_assistant::flow::{ConversationFlow, ConversationStore, WebhookClient};
use zero_hunger_assistant::server::{self, AppState};

/// Real assistance service bound to an ephemeral port.
struct TestServer {
    base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    async fn start() -> Self {
        let webhook = WebhookClient::new(None, Duration::from_secs(1)).unwrap();
        let flow = ConversationFlow::new(ConversationStore::new(), Arc::new(webhook)).unwrap();
        let state = AppState::with_flow(flow);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();
        let origins = ServerConfig::default().allowed_origins;

        tokio::spawn(async move {
            server::serve(listener, state, &origins, async move {
                let _ = rx.await;
            })
            .await
            .unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            shutdown: Some(tx),
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Stub service answering every `/chat` with a fixed status and body, recording requests.
async fn stub_service(status: StatusCode, body: Value) -> (String, Arc<Mutex<Vec<Value>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);
    let app = Router::new().route(
        "/chat",
        post(move |Json(request): Json<Value>| {
            let recorder = Arc::clone(&recorder);
            let body = body.clone();
            async move {
                recorder.lock().unwrap().push(request);
                (status, Json(body))
            }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    (format!("http://{addr}"), seen)
}

fn session_for(base_url: &str) -> ChatSession<HttpTransport> {
    let config = ClientConfig::default().with_api_url(base_url);
    ChatSession::new(HttpTransport::new(&config).unwrap())
}

#[tokio::test]
async fn intake_conversation_against_real_service() {
    let server = TestServer::start().await;
    let session = session_for(&server.base_url);

    let first = session.submit("I need food help").await;
    assert_eq!(
        first,
        SubmitOutcome::Replied(Message::assistant(
            "Thank you for reaching out to the General Food Access Program. To assist you better, may I please have your name?"
        ))
    );
    let session_id = session.session_id().await.expect("service assigns a session");

    session.submit("Maria").await;
    let third = session.submit("34").await;
    match third {
        SubmitOutcome::Replied(message) => {
            assert!(message.content().starts_with("Thank you for providing all the necessary information."));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    assert_eq!(session.session_id().await, Some(session_id));
    assert_eq!(session.messages().await.len(), 7);
}

#[tokio::test]
async fn request_body_carries_null_then_adopted_session() {
    let (base_url, seen) =
        stub_service(StatusCode::OK, json!({"response": "Here is a food bank near you.", "session_id": "abc123"})).await;
    let session = session_for(&base_url);

    session.submit("I need food help").await;
    session.submit("thanks").await;

    let requests = seen.lock().unwrap().clone();
    assert_eq!(requests[0], json!({"message": "I need food help", "session_id": null}));
    assert_eq!(requests[1], json!({"message": "thanks", "session_id": "abc123"}));
    assert_eq!(
        session.session_id().await.map(|id| id.into_string()),
        Some("abc123".to_string())
    );
}

#[tokio::test]
async fn server_error_yields_fallback() {
    let (base_url, seen) =
        stub_service(StatusCode::INTERNAL_SERVER_ERROR, json!({"detail": "boom"})).await;
    let session = session_for(&base_url);

    let outcome = session.submit("hello").await;

    assert_eq!(outcome, SubmitOutcome::Failed(Message::assistant(FALLBACK_REPLY)));
    assert_eq!(seen.lock().unwrap().len(), 1);
    assert!(session.session_id().await.is_none());
}

#[tokio::test]
async fn reply_without_response_field_yields_fallback() {
    let (base_url, _) = stub_service(StatusCode::OK, json!({"session_id": "abc123"})).await;
    let session = session_for(&base_url);

    let outcome = session.submit("hello").await;

    assert_eq!(outcome, SubmitOutcome::Failed(Message::fallback()));
    assert!(session.session_id().await.is_none());
}

#[tokio::test]
async fn unreachable_service_yields_fallback() {
    // Bind then drop a listener to get a port nothing listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let session = session_for(&format!("http://{addr}"));
    let outcome = session.submit("hello").await;

    assert_eq!(outcome, SubmitOutcome::Failed(Message::fallback()));
    assert_eq!(session.messages().await.len(), 3);
}
