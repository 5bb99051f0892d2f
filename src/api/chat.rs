//! Relay endpoint: text or audio in, transcript + reply + speech out

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::ApiState;

/// Build the chat router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .with_state(state)
}

/// Relay request: a typed message or one base64 audio recording
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub audio_buffer: Option<String>,
}

/// Combined relay result
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub transcribed_text: String,
    pub llm_response: String,
    pub audio_url: String,
    pub audio_buffer: String,
}

/// Run the transcription → completion → synthesis chain
///
/// Strictly sequential: each stage consumes the previous stage's output.
/// No retry, no partial results — any upstream failure aborts the cycle.
async fn chat(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ChatError> {
    let ai = state.ai.as_ref().ok_or(ChatError::NotConfigured)?;

    let message = request.message.filter(|m| !m.is_empty());
    let audio = request.audio_buffer.filter(|a| !a.is_empty());

    let transcribed_text = match (message, audio) {
        // A typed message wins; audio is only transcribed without one
        (Some(text), _) => text,
        (None, Some(encoded)) => {
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(&encoded)
                .map_err(|e| ChatError::upstream("transcription", e.to_string()))?;
            ai.transcribe(&bytes)
                .await
                .map_err(|e| ChatError::upstream("transcription", e.to_string()))?
        }
        (None, None) => return Err(ChatError::MissingInput),
    };

    if transcribed_text.is_empty() {
        return Err(ChatError::MissingInput);
    }

    let llm_response = ai
        .complete(&transcribed_text)
        .await
        .map_err(|e| ChatError::upstream("completion", e.to_string()))?;

    let speech = ai
        .synthesize(&llm_response)
        .await
        .map_err(|e| ChatError::upstream("synthesis", e.to_string()))?;

    let encoded = base64::engine::general_purpose::STANDARD.encode(&speech);

    Ok(Json(ChatResponse {
        transcribed_text,
        llm_response,
        audio_url: format!("data:audio/mp3;base64,{encoded}"),
        audio_buffer: encoded,
    }))
}

/// Relay endpoint errors
#[derive(Debug)]
pub enum ChatError {
    /// No AI provider configured
    NotConfigured,
    /// Neither text nor audio supplied (or both empty)
    MissingInput,
    /// An external call failed; stage recorded for the server log only
    Upstream { stage: &'static str, detail: String },
}

impl ChatError {
    fn upstream(stage: &'static str, detail: String) -> Self {
        Self::Upstream { stage, detail }
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorBody {
            error: String,
        }

        let (status, message) = match self {
            Self::NotConfigured => (
                StatusCode::SERVICE_UNAVAILABLE,
                "AI backend not configured".to_string(),
            ),
            Self::MissingInput => (StatusCode::BAD_REQUEST, "No text to process".to_string()),
            Self::Upstream { stage, detail } => {
                // The client gets a generic message; the stage stays server-side
                tracing::error!(stage, error = %detail, "relay chain failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to process request".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
