//! HTTP request handlers

use super::types::{ErrorResponse, HealthResponse};
use super::AppState;
use crate::envelope::{decode_request, encode_response};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Skill invocations
        .route("/", post(handle_envelope))
        // Liveness
        .route("/health", get(health))
        .with_state(state)
}

/// Decode one envelope, dispatch it, render the directive.
/// Only undecodable bodies are rejected; every decoded envelope gets a 200.
async fn handle_envelope(State(state): State<AppState>, body: Bytes) -> Response {
    let envelope = match decode_request(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected request envelope");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response();
        }
    };

    tracing::info!(request = envelope.kind(), "Handling skill request");
    let directive = state.dispatcher.dispatch(&envelope).await;
    Json(encode_response(&directive)).into_response()
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::MockConversationService;
    use crate::skill::{Dispatcher, SkillContext};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn router(mock: Arc<MockConversationService>) -> Router {
        let dispatcher = Dispatcher::standard(SkillContext::new(mock, "test-model"));
        create_router(AppState::new(dispatcher))
    }

    async fn post_envelope(router: Router, body: String) -> (StatusCode, Value) {
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn ask(prompt: &str) -> String {
        json!({
            "version": "1.0",
            "session": { "new": false, "sessionId": "s1" },
            "request": {
                "type": "IntentRequest",
                "requestId": "r1",
                "intent": {
                    "name": "AskIntent",
                    "slots": { "prompt": { "name": "prompt", "value": prompt } }
                }
            }
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_question_round_trip() {
        let mock = Arc::new(MockConversationService::new());
        mock.queue_success("Black holes bend spacetime.");

        let (status, body) = post_envelope(router(mock), ask("explain black holes")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["version"], "1.0");
        let ssml = body["response"]["outputSpeech"]["ssml"].as_str().unwrap();
        assert!(ssml.contains("Black holes bend spacetime."));
        assert_eq!(body["response"]["reprompt"]["outputSpeech"]["type"], "SSML");
        assert_eq!(body["response"]["shouldEndSession"], false);
    }

    #[tokio::test]
    async fn test_session_ended_has_no_speech() {
        let envelope = json!({
            "version": "1.0",
            "request": { "type": "SessionEndedRequest", "reason": "EXCEEDED_MAX_REPROMPTS" }
        })
        .to_string();

        let (status, body) =
            post_envelope(router(Arc::new(MockConversationService::new())), envelope).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "version": "1.0", "response": { "shouldEndSession": true } }));
    }

    #[tokio::test]
    async fn test_unknown_request_type_gets_apology() {
        let envelope = json!({
            "version": "1.0",
            "request": { "type": "SessionResumedRequest", "requestId": "r2" }
        })
        .to_string();

        let (status, body) =
            post_envelope(router(Arc::new(MockConversationService::new())), envelope).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["response"]["outputSpeech"]["ssml"]
            .as_str()
            .unwrap()
            .contains("Sorry, I had trouble"));
        assert_eq!(body["response"]["shouldEndSession"], false);
    }

    #[tokio::test]
    async fn test_undecodable_envelope_is_bad_request() {
        let (status, body) = post_envelope(
            router(Arc::new(MockConversationService::new())),
            "{\"request\": {}}".to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("malformed"));
    }

    #[tokio::test]
    async fn test_health() {
        let response = router(Arc::new(MockConversationService::new()))
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
