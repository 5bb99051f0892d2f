//! Parley - Voice assistant gateway for real-time audio rooms
//!
//! This library provides the core functionality for the parley gateway:
//! - Room session management over a LiveKit media backend
//! - Microphone capture and response playback
//! - An assistant relay that pipes speech or text through external
//!   transcription, completion, and synthesis services
//! - The HTTP surface those pieces talk to (`/api/token`, `/api/chat`)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                     Daemon / CLI                     │
//! │     Room session  │  Recorder  │  Assistant relay    │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                   HTTP API (axum)                    │
//! │     /api/token  │  /api/chat  │  /health            │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │              External collaborators                  │
//! │   LiveKit (rooms)  │  OpenAI (STT / LLM / TTS)      │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod ai;
pub mod api;
pub mod assistant;
pub mod config;
pub mod daemon;
pub mod error;
pub mod room;
pub mod voice;

pub use config::Config;
pub use daemon::{Daemon, JoinOptions};
pub use error::{Error, Result};
