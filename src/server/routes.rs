//! HTTP route handlers for the assistance API.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::ids::SessionId;
use crate::protocol::{ChatRequest, ChatResponse, HealthStatus};

use super::error::ApiError;
use super::state::AppState;

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/chat", post(chat))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy".to_string(),
    })
}

/// Handle one chat turn.
async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload?;

    let message = request.message.trim();
    if message.is_empty() {
        return Err(ApiError::EmptyMessage);
    }

    let requested = request.session_id.and_then(SessionId::from_token);
    let session_id = state.flow.resolve_session(requested);

    let reply = state.flow.process_message(&session_id, message).await;

    Ok(Json(ChatResponse {
        response: reply.message,
        session_id: Some(reply.session_id.into_string()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{ConversationFlow, ConversationStore, WebhookClient};
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use std::time::Duration;
    use tower::ServiceExt;

    fn router() -> (Router, Arc<AppState>) {
        let webhook = WebhookClient::new(None, Duration::from_secs(1)).unwrap();
        let flow = ConversationFlow::new(ConversationStore::new(), Arc::new(webhook)).unwrap();
        let state = AppState::with_flow(flow);
        (create_router(Arc::clone(&state)), state)
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::post("/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = router();
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!({"status": "healthy"}));
    }

    #[tokio::test]
    async fn test_chat_without_session_creates_one() {
        let (app, state) = router();
        let response = app
            .oneshot(post_json(r#"{"message": "I need food help", "session_id": null}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let session = json["session_id"].as_str().unwrap();
        assert!(uuid::Uuid::parse_str(session).is_ok());
        assert!(json["response"].as_str().unwrap().contains("may I please have your name?"));
        assert!(state.flow.store().contains(&SessionId::from_token(session).unwrap()));
    }

    #[tokio::test]
    async fn test_chat_keeps_supplied_session() {
        let (app, _) = router();
        let response = app
            .oneshot(post_json(r#"{"message": "hello", "session_id": "abc123"}"#))
            .await
            .unwrap();

        let json = body_json(response).await;
        assert_eq!(json["session_id"], "abc123");
    }

    #[tokio::test]
    async fn test_empty_session_string_means_new_session() {
        let (app, _) = router();
        let response = app
            .oneshot(post_json(r#"{"message": "hello", "session_id": ""}"#))
            .await
            .unwrap();

        let json = body_json(response).await;
        assert_ne!(json["session_id"], "");
    }

    #[tokio::test]
    async fn test_blank_message_is_bad_request() {
        let (app, _) = router();
        let response = app.oneshot(post_json(r#"{"message": "   "}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["detail"], "message must not be empty");
    }

    #[tokio::test]
    async fn test_malformed_body_is_client_error() {
        let (app, _) = router();
        let response = app.oneshot(post_json(r#"{"text": "hi"}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_json(response).await["detail"].is_string());
    }

    #[tokio::test]
    async fn test_invalid_json_is_bad_request() {
        let (app, state) = router();
        let response = app.oneshot(post_json("{not json")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["detail"].is_string());
        assert!(state.flow.store().is_empty());
    }
}
