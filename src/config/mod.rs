//! Configuration management for the parley gateway

pub mod file;

use crate::{Error, Result};

/// Default LiveKit room joined when none is given
pub const DEFAULT_ROOM: &str = "test-room";

/// Default HTTP API port
pub const DEFAULT_PORT: u16 = 8080;

/// Parley gateway configuration
///
/// Layered: built-in defaults, overridden by the TOML config file,
/// overridden by environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API server port
    pub port: u16,

    /// Room joined by the daemon in `--join` mode
    pub room: String,

    /// `OpenAI` API key (transcription, completion, synthesis)
    pub openai_api_key: Option<String>,

    /// LiveKit media backend credentials
    pub livekit: LiveKitConfig,

    /// Voice pipeline settings
    pub voice: VoiceConfig,
}

/// LiveKit server address and API credentials
#[derive(Debug, Clone, Default)]
pub struct LiveKitConfig {
    /// Server URL (e.g. `wss://example.livekit.cloud`)
    pub url: Option<String>,

    /// API key for token minting and room service calls
    pub api_key: Option<String>,

    /// API secret paired with the key
    pub api_secret: Option<String>,

    /// Join token time-to-live in seconds
    pub token_ttl_seconds: u64,
}

impl LiveKitConfig {
    /// Whether enough is configured to mint tokens and talk to the backend
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.url.is_some() && self.api_key.is_some() && self.api_secret.is_some()
    }
}

/// Voice pipeline settings (models, voice, sampling)
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// STT model (e.g. "whisper-1")
    pub stt_model: String,

    /// Chat completion model (e.g. "gpt-4")
    pub llm_model: String,

    /// Upper bound on completion length
    pub llm_max_tokens: u32,

    /// Completion sampling temperature
    pub llm_temperature: f32,

    /// TTS model (e.g. "tts-1")
    pub tts_model: String,

    /// TTS voice identifier (e.g. "alloy")
    pub tts_voice: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            stt_model: "whisper-1".to_string(),
            llm_model: "gpt-4".to_string(),
            llm_max_tokens: 500,
            llm_temperature: 0.7,
            tts_model: "tts-1".to_string(),
            tts_voice: "alloy".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            room: DEFAULT_ROOM.to_string(),
            openai_api_key: None,
            livekit: LiveKitConfig {
                token_ttl_seconds: 3600,
                ..LiveKitConfig::default()
            },
            voice: VoiceConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the config file and environment
    ///
    /// # Errors
    ///
    /// Returns error if an environment override fails to parse
    pub fn load() -> Result<Self> {
        let file = file::load_config_file();
        let mut config = Self::from_overlay(&file);
        config.apply_env()?;
        Ok(config)
    }

    /// Apply a file overlay on top of defaults
    pub(crate) fn from_overlay(file: &file::ParleyConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(port) = file.server.port {
            config.port = port;
        }
        if let Some(room) = &file.server.room {
            config.room = room.clone();
        }
        if let Some(key) = &file.api_keys.openai {
            config.openai_api_key = Some(key.clone());
        }

        if let Some(url) = &file.livekit.url {
            config.livekit.url = Some(url.clone());
        }
        if let Some(key) = &file.livekit.api_key {
            config.livekit.api_key = Some(key.clone());
        }
        if let Some(secret) = &file.livekit.api_secret {
            config.livekit.api_secret = Some(secret.clone());
        }
        if let Some(ttl) = file.livekit.token_ttl_seconds {
            config.livekit.token_ttl_seconds = ttl;
        }

        let v = &file.voice;
        if let Some(m) = &v.stt_model {
            config.voice.stt_model = m.clone();
        }
        if let Some(m) = &v.llm_model {
            config.voice.llm_model = m.clone();
        }
        if let Some(t) = v.llm_max_tokens {
            config.voice.llm_max_tokens = t;
        }
        if let Some(t) = v.llm_temperature {
            config.voice.llm_temperature = t;
        }
        if let Some(m) = &v.tts_model {
            config.voice.tts_model = m.clone();
        }
        if let Some(m) = &v.tts_voice {
            config.voice.tts_voice = m.clone();
        }

        config
    }

    /// Environment variable overrides (highest precedence)
    fn apply_env(&mut self) -> Result<()> {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.is_empty() {
                self.openai_api_key = Some(key);
            }
        }
        if let Ok(url) = std::env::var("LIVEKIT_URL") {
            if !url.is_empty() {
                self.livekit.url = Some(url);
            }
        }
        if let Ok(key) = std::env::var("LIVEKIT_API_KEY") {
            if !key.is_empty() {
                self.livekit.api_key = Some(key);
            }
        }
        if let Ok(secret) = std::env::var("LIVEKIT_API_SECRET") {
            if !secret.is_empty() {
                self.livekit.api_secret = Some(secret);
            }
        }
        if let Ok(port) = std::env::var("PARLEY_PORT") {
            self.port = port
                .parse()
                .map_err(|_| Error::Config(format!("invalid PARLEY_PORT: {port}")))?;
        }
        if let Ok(room) = std::env::var("PARLEY_ROOM") {
            if !room.is_empty() {
                self.room = room;
            }
        }
        Ok(())
    }
}
