//! Join token minting

use std::time::Duration;

use livekit_api::access_token::{AccessToken, VideoGrants};

use crate::config::LiveKitConfig;
use crate::{Error, Result};

/// Mint a signed join token for (room, participant)
///
/// The token is consumed once at join time; the backend enforces expiry.
///
/// # Errors
///
/// Returns error if LiveKit credentials are missing or signing fails
pub fn mint_join_token(
    livekit: &LiveKitConfig,
    room_name: &str,
    participant_name: &str,
) -> Result<String> {
    let (Some(api_key), Some(api_secret)) = (&livekit.api_key, &livekit.api_secret) else {
        return Err(Error::Config("LiveKit API key/secret not configured".to_string()));
    };

    let token = AccessToken::with_api_key(api_key, api_secret)
        .with_identity(participant_name)
        .with_name(participant_name)
        .with_grants(VideoGrants {
            room_join: true,
            room: room_name.to_string(),
            can_publish: true,
            can_subscribe: true,
            can_publish_data: true,
            ..Default::default()
        })
        .with_ttl(Duration::from_secs(livekit.token_ttl_seconds));

    token.to_jwt().map_err(|e| Error::Token(e.to_string()))
}
