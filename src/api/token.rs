//! Token issuance endpoint

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};

use crate::room;

use super::ApiState;

/// Build the token router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/token", post(token))
        .with_state(state)
}

/// Token request: who wants to join which room
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    #[serde(default)]
    pub room_name: Option<String>,

    #[serde(default)]
    pub participant_name: Option<String>,
}

/// Issued credential
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Issue a signed join credential for (room, participant)
async fn token(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, TokenError> {
    let room_name = request
        .room_name
        .filter(|r| !r.is_empty())
        .ok_or(TokenError::MissingField("roomName"))?;
    let participant_name = request
        .participant_name
        .filter(|p| !p.is_empty())
        .ok_or(TokenError::MissingField("participantName"))?;

    if !state.livekit.is_configured() {
        return Err(TokenError::NotConfigured);
    }

    // Best-effort: have the room ready before the participant connects
    if let Some(backend) = &state.room_backend {
        if let Err(e) = backend.ensure_room(&room_name).await {
            tracing::warn!(room = %room_name, error = %e, "room creation failed, issuing token anyway");
        }
    }

    let jwt = room::token::mint_join_token(&state.livekit, &room_name, &participant_name)
        .map_err(|e| TokenError::Mint(e.to_string()))?;

    tracing::debug!(room = %room_name, participant = %participant_name, "token issued");
    Ok(Json(TokenResponse { token: jwt }))
}

/// Token endpoint errors
#[derive(Debug)]
pub enum TokenError {
    MissingField(&'static str),
    NotConfigured,
    Mint(String),
}

impl IntoResponse for TokenError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorBody {
            error: String,
        }

        let (status, message) = match self {
            Self::MissingField(field) => {
                (StatusCode::BAD_REQUEST, format!("{field} is required"))
            }
            Self::NotConfigured => (
                StatusCode::SERVICE_UNAVAILABLE,
                "LiveKit not configured".to_string(),
            ),
            Self::Mint(detail) => {
                tracing::error!(error = %detail, "token minting failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to create token".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
