//! Assistant relay client
//!
//! Serializes recorded audio or typed text, sends it to the relay endpoint,
//! and keeps the session-scoped conversation log. The log lives in memory
//! only and dies with the process.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{Error, Result};

/// Who produced a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// One conversation turn
#[derive(Debug, Clone)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Combined result from the relay endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayReply {
    pub transcribed_text: String,
    pub llm_response: String,
    pub audio_url: String,
    pub audio_buffer: String,
}

impl RelayReply {
    /// Decode the synthesized audio back to MP3 bytes
    ///
    /// # Errors
    ///
    /// Returns error if the payload is not valid base64
    pub fn decode_audio(&self) -> Result<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.audio_buffer)
            .map_err(|e| Error::Relay(format!("invalid audio payload: {e}")))
    }
}

/// Client for the relay endpoint plus the conversation it feeds
pub struct AssistantRelay {
    client: reqwest::Client,
    endpoint: String,
    conversation: Vec<Turn>,
    processing: Arc<AtomicBool>,
}

impl AssistantRelay {
    /// Create a relay client against the given `/api/chat` URL
    #[must_use]
    pub fn new(endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            conversation: Vec::new(),
            processing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a request is outstanding
    ///
    /// Advisory only: callers use it to disable input, nothing serializes
    /// concurrent submissions at the protocol level.
    #[must_use]
    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::SeqCst)
    }

    /// Shared handle to the processing flag, for display layers
    #[must_use]
    pub fn processing_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.processing)
    }

    /// The ordered conversation log
    #[must_use]
    pub fn conversation(&self) -> &[Turn] {
        &self.conversation
    }

    /// Send a typed message
    ///
    /// On success appends the user and assistant turns, in that order.
    ///
    /// # Errors
    ///
    /// Returns error on any request or decode failure; the conversation is
    /// left unchanged
    pub async fn send_text(&mut self, text: &str) -> Result<RelayReply> {
        let captured_at = Utc::now();
        let body = serde_json::json!({ "message": text });

        let reply = self.submit(body).await?;
        self.record_exchange(text.to_string(), reply.llm_response.clone(), captured_at);
        Ok(reply)
    }

    /// Send one recorded audio blob (WAV bytes)
    ///
    /// The user turn's text is the transcript the relay returns.
    ///
    /// # Errors
    ///
    /// Returns error on any request or decode failure; the conversation is
    /// left unchanged
    pub async fn send_audio(&mut self, wav: &[u8]) -> Result<RelayReply> {
        let captured_at = Utc::now();
        let encoded = base64::engine::general_purpose::STANDARD.encode(wav);
        let body = serde_json::json!({ "audioBuffer": encoded });

        let reply = self.submit(body).await?;
        self.record_exchange(
            reply.transcribed_text.clone(),
            reply.llm_response.clone(),
            captured_at,
        );
        Ok(reply)
    }

    /// Issue one request, holding the processing flag for its duration
    async fn submit(&mut self, body: serde_json::Value) -> Result<RelayReply> {
        self.processing.store(true, Ordering::SeqCst);
        let result = self.submit_inner(body).await;
        self.processing.store(false, Ordering::SeqCst);

        if let Err(e) = &result {
            tracing::warn!(error = %e, "relay request failed");
        }
        result
    }

    async fn submit_inner(&self, body: serde_json::Value) -> Result<RelayReply> {
        let response = self.client.post(&self.endpoint).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Relay(format!("relay endpoint error {status}: {body}")));
        }

        Ok(response.json().await?)
    }

    /// Append the user/assistant turn pair for one successful round trip
    fn record_exchange(&mut self, user_text: String, assistant_text: String, captured_at: DateTime<Utc>) {
        self.conversation.push(Turn {
            role: Role::User,
            text: user_text,
            timestamp: captured_at,
        });
        self.conversation.push(Turn {
            role: Role::Assistant,
            text: assistant_text,
            timestamp: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exchange_appends_user_then_assistant() {
        let mut relay = AssistantRelay::new("http://127.0.0.1:0/api/chat".to_string());

        relay.record_exchange("hello".to_string(), "hi there".to_string(), Utc::now());

        let turns = relay.conversation();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[0].text, "hello");
        assert_eq!(turns[1].role, Role::Assistant);
        assert_eq!(turns[1].text, "hi there");
        assert!(turns[0].timestamp <= turns[1].timestamp);
    }

    #[test]
    fn reply_audio_round_trips_base64() {
        let reply = RelayReply {
            transcribed_text: "hello".to_string(),
            llm_response: "hi".to_string(),
            audio_url: "data:audio/mp3;base64,AAEC".to_string(),
            audio_buffer: "AAEC".to_string(),
        };

        assert_eq!(reply.decode_audio().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn bad_audio_payload_is_a_relay_error() {
        let reply = RelayReply {
            transcribed_text: String::new(),
            llm_response: String::new(),
            audio_url: String::new(),
            audio_buffer: "not base64!!!".to_string(),
        };

        assert!(matches!(reply.decode_audio(), Err(Error::Relay(_))));
    }
}
