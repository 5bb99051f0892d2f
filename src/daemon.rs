//! Gateway daemon
//!
//! Wires configuration into the API server and, in `--join` mode, runs a
//! room session with a push-to-talk assistant loop driven from the
//! terminal: an empty line toggles recording, any other line is sent as a
//! typed message.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::ai::{AiBackend, OpenAiBackend};
use crate::api::{ApiServer, ApiState};
use crate::assistant::AssistantRelay;
use crate::config::Config;
use crate::room::{LiveKitBackend, RoomBackend, RoomSession, SessionOptions, token};
use crate::voice::{MicCapture, RecorderState, play_mp3_detached};
use crate::{Error, Result};

/// Interval between participant mirror refreshes
const PARTICIPANT_REFRESH: Duration = Duration::from_secs(5);

/// Room join parameters for `--join` mode
#[derive(Debug, Clone)]
pub struct JoinOptions {
    /// Room to join
    pub room: String,

    /// Local participant identity
    pub identity: String,
}

/// The parley gateway daemon
pub struct Daemon {
    config: Config,
}

impl Daemon {
    /// Create a daemon from configuration
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the daemon until interrupted
    ///
    /// Always serves the HTTP API; with `join` set, also joins the room
    /// and runs the assistant loop.
    ///
    /// # Errors
    ///
    /// Returns error if a backend cannot be built or the session fails to
    /// establish
    #[allow(clippy::future_not_send)]
    pub async fn run(&self, join: Option<JoinOptions>) -> Result<()> {
        let ai: Option<Arc<dyn AiBackend>> = match &self.config.openai_api_key {
            Some(key) => Some(Arc::new(OpenAiBackend::new(
                key.clone(),
                self.config.voice.clone(),
            )?)),
            None => {
                tracing::warn!("OPENAI_API_KEY not set, relay endpoint disabled");
                None
            }
        };

        let lk = &self.config.livekit;
        let room_backend: Option<Arc<dyn RoomBackend>> = if lk.is_configured() {
            // is_configured guarantees all three fields
            Some(Arc::new(LiveKitBackend::new(
                lk.url.as_deref().unwrap_or_default(),
                lk.api_key.as_deref().unwrap_or_default(),
                lk.api_secret.as_deref().unwrap_or_default(),
            )))
        } else {
            tracing::warn!("LiveKit not configured, token endpoint and room join disabled");
            None
        };

        let state = Arc::new(ApiState::new(&self.config, ai, room_backend.clone()));
        let server = ApiServer::new(state, self.config.port).spawn();

        let result = match join {
            Some(options) => {
                let backend = room_backend
                    .ok_or_else(|| Error::Config("room join requires LiveKit credentials".to_string()))?;
                self.run_session(backend, options).await
            }
            None => {
                tokio::signal::ctrl_c()
                    .await
                    .map_err(|e| Error::Config(format!("signal handler failed: {e}")))?;
                tracing::info!("shutdown requested");
                Ok(())
            }
        };

        server.abort();
        result
    }

    /// Join the room and run the push-to-talk assistant loop
    #[allow(clippy::future_not_send)]
    async fn run_session(&self, backend: Arc<dyn RoomBackend>, options: JoinOptions) -> Result<()> {
        let jwt = token::mint_join_token(&self.config.livekit, &options.room, &options.identity)?;

        let mic = match MicCapture::open() {
            Ok(capture) => Some(capture),
            Err(e) => {
                tracing::warn!(error = %e, "no microphone, text input only");
                None
            }
        };

        let remote_gone = Arc::new(AtomicBool::new(false));
        let remote_flag = Arc::clone(&remote_gone);

        let mut session = RoomSession::connect(
            backend,
            SessionOptions {
                room: options.room.clone(),
                identity: options.identity.clone(),
                token: jwt,
            },
            mic,
            move || {
                remote_flag.store(true, Ordering::SeqCst);
            },
        )
        .await?;

        let mut relay = AssistantRelay::new(format!(
            "http://127.0.0.1:{}/api/chat",
            self.config.port
        ));

        println!("Joined room \"{}\" as \"{}\".", options.room, options.identity);
        println!("Press Enter to start/stop recording, type to send text, \"quit\" to leave.");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut refresh = tokio::time::interval(PARTICIPANT_REFRESH);

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("shutdown requested");
                    break;
                }
                _ = refresh.tick() => {
                    if let Err(e) = session.refresh_participants().await {
                        tracing::debug!(error = %e, "participant refresh failed");
                    } else {
                        tracing::debug!(participants = session.participants().len(), "mirror refreshed");
                    }
                }
                line = lines.next_line() => {
                    match line {
                        Ok(Some(line)) => {
                            let line = line.trim();
                            if line == "quit" {
                                break;
                            }
                            if line.is_empty() {
                                toggle_recording(&mut session, &mut relay).await;
                            } else {
                                send_text(&mut relay, line).await;
                            }
                        }
                        Ok(None) | Err(_) => break,
                    }
                }
            }

            if remote_gone.load(Ordering::SeqCst) {
                tracing::info!("disconnected by the backend");
                break;
            }
        }

        session.leave().await;
        Ok(())
    }
}

/// Empty-line handler: start a recording span, or finish one and relay it
#[allow(clippy::future_not_send)]
async fn toggle_recording(session: &mut RoomSession, relay: &mut AssistantRelay) {
    let Some(recorder) = session.recorder_mut() else {
        println!("No microphone available.");
        return;
    };

    match recorder.state() {
        RecorderState::Idle => match recorder.start_recording() {
            Ok(()) => println!("Recording... press Enter to stop."),
            Err(e) => tracing::error!(error = %e, "failed to start recording"),
        },
        RecorderState::Recording => {
            let wav = match recorder.stop_recording() {
                Ok(Some(wav)) => wav,
                Ok(None) => return,
                Err(e) => {
                    tracing::error!(error = %e, "failed to finalize recording");
                    return;
                }
            };

            println!("Processing...");
            match relay.send_audio(&wav).await {
                Ok(reply) => {
                    println!("You: {}", reply.transcribed_text);
                    println!("Assistant: {}", reply.llm_response);
                    play_reply_audio(&reply);
                }
                Err(e) => tracing::error!(error = %e, "assistant request failed"),
            }

            if let Some(recorder) = session.recorder_mut() {
                recorder.finish();
            }
        }
        RecorderState::Processing => {
            tracing::debug!("still processing the previous recording");
        }
    }
}

/// Typed-line handler: relay a text message
async fn send_text(relay: &mut AssistantRelay, text: &str) {
    match relay.send_text(text).await {
        Ok(reply) => {
            println!("Assistant: {}", reply.llm_response);
            play_reply_audio(&reply);
        }
        Err(e) => tracing::error!(error = %e, "assistant request failed"),
    }
}

/// Fire-and-forget playback of a relay reply
fn play_reply_audio(reply: &crate::assistant::RelayReply) {
    match reply.decode_audio() {
        Ok(mp3) => play_mp3_detached(mp3),
        Err(e) => tracing::warn!(error = %e, "response audio undecodable"),
    }
}
