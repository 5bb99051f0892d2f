//! API endpoint integration tests

use std::sync::Arc;
use std::sync::atomic::Ordering;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::Engine;
use parley::api::{ApiServer, ApiState};
use parley::config::LiveKitConfig;
use tower::ServiceExt;

mod common;
use common::{MockAiBackend, build_test_router};

fn json_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_chat_with_message() {
    let ai = MockAiBackend::working();
    let app = build_test_router(Some(ai.clone()));

    let response = app
        .oneshot(json_post("/api/chat", r#"{"message": "hello"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["transcribedText"], "hello");
    assert!(!json["llmResponse"].as_str().unwrap().is_empty());
    assert!(
        json["audioUrl"]
            .as_str()
            .unwrap()
            .starts_with("data:audio/mp3;base64,")
    );
    assert!(!json["audioBuffer"].as_str().unwrap().is_empty());

    // Text input skips transcription entirely
    assert_eq!(ai.transcribe_calls.load(Ordering::SeqCst), 0);
    assert_eq!(ai.complete_calls.load(Ordering::SeqCst), 1);
    assert_eq!(ai.synthesize_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_chat_with_audio() {
    let ai = MockAiBackend::working();
    let app = build_test_router(Some(ai.clone()));

    let audio = base64::engine::general_purpose::STANDARD.encode([0u8; 64]);
    let response = app
        .oneshot(json_post(
            "/api/chat",
            &format!(r#"{{"audioBuffer": "{audio}"}}"#),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["transcribedText"], "what time is it");
    assert_eq!(ai.transcribe_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_chat_message_wins_over_audio() {
    let ai = MockAiBackend::working();
    let app = build_test_router(Some(ai.clone()));

    let response = app
        .oneshot(json_post(
            "/api/chat",
            r#"{"message": "typed", "audioBuffer": "AAAA"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["transcribedText"], "typed");
    assert_eq!(ai.transcribe_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_chat_empty_body_is_bad_request() {
    let app = build_test_router(Some(MockAiBackend::working()));

    let response = app.oneshot(json_post("/api/chat", "{}")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], "No text to process");
}

#[tokio::test]
async fn test_chat_empty_message_is_bad_request() {
    let app = build_test_router(Some(MockAiBackend::working()));

    let response = app
        .oneshot(json_post("/api/chat", r#"{"message": ""}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_chat_transcription_failure_stops_the_chain() {
    let ai = MockAiBackend::broken_transcription();
    let app = build_test_router(Some(ai.clone()));

    let audio = base64::engine::general_purpose::STANDARD.encode([0u8; 64]);
    let response = app
        .oneshot(json_post(
            "/api/chat",
            &format!(r#"{{"audioBuffer": "{audio}"}}"#),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert_eq!(json["error"], "Failed to process request");

    // Later stages must never run
    assert_eq!(ai.complete_calls.load(Ordering::SeqCst), 0);
    assert_eq!(ai.synthesize_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_chat_without_backend_is_unavailable() {
    let app = build_test_router(None);

    let response = app
        .oneshot(json_post("/api/chat", r#"{"message": "hello"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_token_issuance() {
    let app = build_test_router(None);

    let response = app
        .oneshot(json_post(
            "/api/token",
            r#"{"roomName": "test-room", "participantName": "alice"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let token = json["token"].as_str().unwrap();
    assert_eq!(token.split('.').count(), 3);
}

#[tokio::test]
async fn test_token_requires_both_names() {
    let app = build_test_router(None);

    let response = app
        .oneshot(json_post("/api/token", r#"{"roomName": "test-room"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], "participantName is required");
}

#[tokio::test]
async fn test_token_without_credentials_is_unavailable() {
    let state = Arc::new(ApiState {
        ai: None,
        livekit: LiveKitConfig::default(),
        room_backend: None,
    });
    let app = ApiServer::router(state);

    let response = app
        .oneshot(json_post(
            "/api/token",
            r#"{"roomName": "test-room", "participantName": "alice"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = build_test_router(None);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_status_reports_backend_availability() {
    let app = build_test_router(Some(MockAiBackend::working()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["ai_available"], true);
    assert_eq!(json["room_available"], true);
}

// Keep the helper exercised in both directions
#[tokio::test]
async fn test_status_without_backends() {
    let state = Arc::new(ApiState {
        ai: None,
        livekit: LiveKitConfig::default(),
        room_backend: None,
    });
    let app = ApiServer::router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let json = body_json(response).await;
    assert_eq!(json["ai_available"], false);
    assert_eq!(json["room_available"], false);
}
