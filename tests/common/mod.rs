//! Shared test helpers

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use parley::ai::AiBackend;
use parley::api::{ApiServer, ApiState};
use parley::config::LiveKitConfig;
use parley::{Error, Result};

/// Scripted AI backend: canned outputs, per-stage call counters
pub struct MockAiBackend {
    pub fail_transcription: bool,
    pub transcribe_calls: AtomicUsize,
    pub complete_calls: AtomicUsize,
    pub synthesize_calls: AtomicUsize,
}

impl MockAiBackend {
    pub fn working() -> Arc<Self> {
        Arc::new(Self {
            fail_transcription: false,
            transcribe_calls: AtomicUsize::new(0),
            complete_calls: AtomicUsize::new(0),
            synthesize_calls: AtomicUsize::new(0),
        })
    }

    pub fn broken_transcription() -> Arc<Self> {
        Arc::new(Self {
            fail_transcription: true,
            transcribe_calls: AtomicUsize::new(0),
            complete_calls: AtomicUsize::new(0),
            synthesize_calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl AiBackend for MockAiBackend {
    async fn transcribe(&self, _audio: &[u8]) -> Result<String> {
        self.transcribe_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_transcription {
            return Err(Error::Stt("transcription service unavailable".to_string()));
        }
        Ok("what time is it".to_string())
    }

    async fn complete(&self, text: &str) -> Result<String> {
        self.complete_calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("You said: {text}"))
    }

    async fn synthesize(&self, _text: &str) -> Result<Vec<u8>> {
        self.synthesize_calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![0xFF, 0xFB, 0x90, 0x00])
    }
}

/// LiveKit credentials good enough for local token minting
pub fn test_livekit_config() -> LiveKitConfig {
    LiveKitConfig {
        url: Some("wss://lk.example.com".to_string()),
        api_key: Some("devkey".to_string()),
        api_secret: Some("devsecret-at-least-32-characters-long".to_string()),
        token_ttl_seconds: 3600,
    }
}

/// Build a test router around an optional AI backend
pub fn build_test_router(ai: Option<Arc<dyn AiBackend>>) -> axum::Router {
    let state = Arc::new(ApiState {
        ai,
        livekit: test_livekit_config(),
        room_backend: None,
    });

    ApiServer::router(state)
}
