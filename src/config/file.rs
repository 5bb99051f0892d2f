//! TOML configuration file loading
//!
//! Supports `~/.config/parley/config.toml` as a persistent config source.
//! All fields are optional — the file is a partial overlay on top of defaults.

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct ParleyConfigFile {
    /// Server/runtime configuration
    #[serde(default)]
    pub server: ServerFileConfig,

    /// Voice pipeline configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// LiveKit backend configuration
    #[serde(default)]
    pub livekit: LiveKitFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,
}

/// Server/runtime configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// HTTP API server port
    pub port: Option<u16>,

    /// Default room for `--join` mode
    pub room: Option<String>,
}

/// Voice pipeline configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// STT model (e.g. "whisper-1")
    pub stt_model: Option<String>,

    /// Chat completion model (e.g. "gpt-4")
    pub llm_model: Option<String>,

    /// Upper bound on completion length
    pub llm_max_tokens: Option<u32>,

    /// Completion sampling temperature
    pub llm_temperature: Option<f32>,

    /// TTS model (e.g. "tts-1")
    pub tts_model: Option<String>,

    /// TTS voice identifier (e.g. "alloy")
    pub tts_voice: Option<String>,
}

/// LiveKit backend configuration
#[derive(Debug, Default, Deserialize)]
pub struct LiveKitFileConfig {
    /// Server URL
    pub url: Option<String>,

    /// API key
    pub api_key: Option<String>,

    /// API secret
    pub api_secret: Option<String>,

    /// Join token time-to-live in seconds
    pub token_ttl_seconds: Option<u64>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub openai: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `ParleyConfigFile::default()` if the file doesn't exist or can't
/// be parsed.
pub fn load_config_file() -> ParleyConfigFile {
    let Some(path) = config_file_path() else {
        return ParleyConfigFile::default();
    };

    if !path.exists() {
        return ParleyConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                ParleyConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            ParleyConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/parley/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("parley").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_parses_to_defaults() {
        let file: ParleyConfigFile = toml::from_str("").unwrap();
        assert!(file.server.port.is_none());
        assert!(file.voice.stt_model.is_none());
        assert!(file.livekit.url.is_none());
        assert!(file.api_keys.openai.is_none());
    }

    #[test]
    fn unknown_sections_are_ignored() {
        let file: ParleyConfigFile = toml::from_str(
            r#"
            [server]
            port = 1234

            [future_section]
            key = "value"
            "#,
        )
        .unwrap();
        assert_eq!(file.server.port, Some(1234));
    }
}
