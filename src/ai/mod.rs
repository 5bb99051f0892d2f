//! AI provider clients
//!
//! The external speech and language services sit behind the [`AiBackend`]
//! capability trait so the relay endpoint can be exercised against mocks.

mod openai;

pub use openai::OpenAiBackend;

use async_trait::async_trait;

use crate::Result;

/// System instruction sent with every completion request
pub const SYSTEM_PROMPT: &str = "You are a helpful voice assistant. Keep responses \
conversational and concise since they will be spoken aloud.";

/// Narrow capability interface over the hosted AI provider
///
/// One method per pipeline stage: transcription, completion, synthesis.
#[async_trait]
pub trait AiBackend: Send + Sync {
    /// Transcribe WAV audio bytes to text
    async fn transcribe(&self, audio: &[u8]) -> Result<String>;

    /// Generate a reply to a single user message
    async fn complete(&self, text: &str) -> Result<String>;

    /// Synthesize text to spoken audio (MP3 bytes)
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}
