//! Real-time audio room integration
//!
//! Transport and media negotiation are delegated to the LiveKit backend;
//! this module mints join credentials and tracks session/participant state.

mod session;
pub mod token;

pub use session::{RoomSession, SessionOptions};

use async_trait::async_trait;
use livekit_api::services::room::{CreateRoomOptions, RoomClient};

use crate::{Error, Result};

/// Read-only view of one room participant, mirrored from the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    /// Identity string the participant joined with
    pub identity: String,

    /// Whether the participant has a live (unmuted) audio track
    pub speaking: bool,

    /// Number of published tracks
    pub track_count: usize,
}

impl From<&livekit_protocol::ParticipantInfo> for Participant {
    fn from(info: &livekit_protocol::ParticipantInfo) -> Self {
        let speaking = info
            .tracks
            .iter()
            .any(|t| t.r#type == livekit_protocol::TrackType::Audio as i32 && !t.muted);

        Self {
            identity: info.identity.clone(),
            speaking,
            track_count: info.tracks.len(),
        }
    }
}

/// Narrow capability interface over the room service backend
#[async_trait]
pub trait RoomBackend: Send + Sync {
    /// Make sure the named room exists
    async fn ensure_room(&self, name: &str) -> Result<()>;

    /// List the room's current participants
    async fn list_participants(&self, room: &str) -> Result<Vec<Participant>>;

    /// Remove a participant from a room
    async fn remove_participant(&self, room: &str, identity: &str) -> Result<()>;
}

/// LiveKit room service implementation of [`RoomBackend`]
pub struct LiveKitBackend {
    client: RoomClient,
}

impl LiveKitBackend {
    /// Create a backend against a LiveKit server
    #[must_use]
    pub fn new(url: &str, api_key: &str, api_secret: &str) -> Self {
        Self {
            client: RoomClient::with_api_key(url, api_key, api_secret),
        }
    }
}

#[async_trait]
impl RoomBackend for LiveKitBackend {
    async fn ensure_room(&self, name: &str) -> Result<()> {
        self.client
            .create_room(name, CreateRoomOptions::default())
            .await
            .map(|_| ())
            .map_err(|e| Error::Room(e.to_string()))
    }

    async fn list_participants(&self, room: &str) -> Result<Vec<Participant>> {
        let participants = self
            .client
            .list_participants(room)
            .await
            .map_err(|e| Error::Room(e.to_string()))?;

        Ok(participants.iter().map(Participant::from).collect())
    }

    async fn remove_participant(&self, room: &str, identity: &str) -> Result<()> {
        self.client
            .remove_participant(room, identity)
            .await
            .map_err(|e| Error::Room(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(kind: livekit_protocol::TrackType, muted: bool) -> livekit_protocol::TrackInfo {
        livekit_protocol::TrackInfo {
            r#type: kind as i32,
            muted,
            ..Default::default()
        }
    }

    #[test]
    fn participant_mirror_derives_speaking_from_audio_tracks() {
        let info = livekit_protocol::ParticipantInfo {
            identity: "alice".to_string(),
            tracks: vec![track(livekit_protocol::TrackType::Audio, false)],
            ..Default::default()
        };

        let p = Participant::from(&info);
        assert_eq!(p.identity, "alice");
        assert!(p.speaking);
        assert_eq!(p.track_count, 1);
    }

    #[test]
    fn muted_audio_is_not_speaking() {
        let info = livekit_protocol::ParticipantInfo {
            identity: "bob".to_string(),
            tracks: vec![
                track(livekit_protocol::TrackType::Audio, true),
                track(livekit_protocol::TrackType::Video, false),
            ],
            ..Default::default()
        };

        let p = Participant::from(&info);
        assert!(!p.speaking);
        assert_eq!(p.track_count, 2);
    }
}
