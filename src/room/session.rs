//! Room session lifecycle

use std::sync::Arc;

use crate::voice::{MicCapture, Recorder};
use crate::{Error, Result};

use super::{Participant, RoomBackend};

/// Parameters for joining a room
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Room name
    pub room: String,

    /// Local participant identity
    pub identity: String,

    /// Signed join credential, consumed once here
    pub token: String,
}

/// One established session with the media backend
///
/// Holds the microphone for the session's duration and mirrors remote
/// participant state read-only. Disconnecting is idempotent and fires the
/// caller-supplied callback exactly once, whether the disconnect is local,
/// remote, or implicit in drop.
pub struct RoomSession {
    backend: Arc<dyn RoomBackend>,
    options: SessionOptions,
    connected: bool,
    participants: Vec<Participant>,
    on_disconnected: Option<Box<dyn FnOnce() + Send>>,
    recorder: Option<Recorder<MicCapture>>,
}

impl RoomSession {
    /// Establish a session
    ///
    /// Ensures the room exists, acquires the microphone (when one is
    /// given — headless deployments pass `None`), and takes the initial
    /// participant snapshot.
    ///
    /// # Errors
    ///
    /// Returns error if the credential is empty, the backend refuses, or
    /// the microphone stream cannot start
    pub async fn connect(
        backend: Arc<dyn RoomBackend>,
        options: SessionOptions,
        mic: Option<MicCapture>,
        on_disconnected: impl FnOnce() + Send + 'static,
    ) -> Result<Self> {
        if options.token.is_empty() {
            return Err(Error::Token("empty join credential".to_string()));
        }

        backend.ensure_room(&options.room).await?;

        let recorder = match mic {
            Some(mut capture) => {
                capture.start()?;
                Some(Recorder::new(capture))
            }
            None => None,
        };

        let participants = backend.list_participants(&options.room).await?;

        tracing::info!(
            room = %options.room,
            identity = %options.identity,
            participants = participants.len(),
            "room session established"
        );

        Ok(Self {
            backend,
            options,
            connected: true,
            participants,
            on_disconnected: Some(Box::new(on_disconnected)),
            recorder,
        })
    }

    /// Whether the session is still connected
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Room name this session joined
    #[must_use]
    pub fn room(&self) -> &str {
        &self.options.room
    }

    /// Current participant mirror (read-only view state)
    #[must_use]
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// The session's recorder, when a microphone was acquired
    pub fn recorder_mut(&mut self) -> Option<&mut Recorder<MicCapture>> {
        self.recorder.as_mut()
    }

    /// Pause or resume the local microphone (mute toggle)
    ///
    /// # Errors
    ///
    /// Returns error if no microphone was acquired or the device refuses
    pub fn set_mic_enabled(&self, enabled: bool) -> Result<()> {
        let recorder = self
            .recorder
            .as_ref()
            .ok_or_else(|| Error::Audio("no microphone in this session".to_string()))?;
        recorder.source().set_enabled(enabled)
    }

    /// Replace the participant mirror with a fresh backend snapshot
    ///
    /// # Errors
    ///
    /// Returns error if the session is disconnected or the backend fails
    pub async fn refresh_participants(&mut self) -> Result<()> {
        if !self.connected {
            return Err(Error::Room("session disconnected".to_string()));
        }

        self.participants = self.backend.list_participants(&self.options.room).await?;
        Ok(())
    }

    /// Leave the room: best-effort server-side removal, then local teardown
    pub async fn leave(&mut self) {
        if !self.connected {
            return;
        }

        if let Err(e) = self
            .backend
            .remove_participant(&self.options.room, &self.options.identity)
            .await
        {
            tracing::debug!(error = %e, "server-side removal failed, disconnecting anyway");
        }

        self.disconnect();
    }

    /// Tear the session down
    ///
    /// Idempotent: repeated calls are no-ops. Releases the microphone and
    /// invokes the disconnect callback at most once.
    pub fn disconnect(&mut self) {
        if !self.connected {
            return;
        }
        self.connected = false;

        if let Some(mut recorder) = self.recorder.take() {
            recorder.source_mut().stop();
        }

        if let Some(callback) = self.on_disconnected.take() {
            callback();
        }

        tracing::info!(room = %self.options.room, "room session closed");
    }

    /// Handle a backend-initiated disconnect (same teardown path)
    pub fn notify_remote_disconnected(&mut self) {
        self.disconnect();
    }
}

impl Drop for RoomSession {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;

    struct MockBackend {
        participants: Vec<Participant>,
        removals: AtomicUsize,
    }

    impl MockBackend {
        fn empty() -> Arc<Self> {
            Arc::new(Self {
                participants: Vec::new(),
                removals: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl RoomBackend for MockBackend {
        async fn ensure_room(&self, _name: &str) -> Result<()> {
            Ok(())
        }

        async fn list_participants(&self, _room: &str) -> Result<Vec<Participant>> {
            Ok(self.participants.clone())
        }

        async fn remove_participant(&self, _room: &str, _identity: &str) -> Result<()> {
            self.removals.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn options() -> SessionOptions {
        SessionOptions {
            room: "test-room".to_string(),
            identity: "alice".to_string(),
            token: "header.payload.signature".to_string(),
        }
    }

    #[tokio::test]
    async fn empty_credential_is_rejected() {
        let result = RoomSession::connect(
            MockBackend::empty(),
            SessionOptions {
                token: String::new(),
                ..options()
            },
            None,
            || {},
        )
        .await;

        assert!(matches!(result, Err(Error::Token(_))));
    }

    #[tokio::test]
    async fn repeated_disconnect_fires_callback_once() {
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_cb = Arc::clone(&fired);

        let mut session = RoomSession::connect(MockBackend::empty(), options(), None, move || {
            fired_cb.fetch_add(1, Ordering::SeqCst);
        })
        .await
        .unwrap();

        assert!(session.is_connected());

        session.disconnect();
        session.disconnect();
        session.disconnect();

        assert!(!session.is_connected());
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn drop_after_disconnect_does_not_refire() {
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_cb = Arc::clone(&fired);

        {
            let mut session =
                RoomSession::connect(MockBackend::empty(), options(), None, move || {
                    fired_cb.fetch_add(1, Ordering::SeqCst);
                })
                .await
                .unwrap();
            session.disconnect();
        }

        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn drop_without_disconnect_still_fires_once() {
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_cb = Arc::clone(&fired);

        {
            let _session =
                RoomSession::connect(MockBackend::empty(), options(), None, move || {
                    fired_cb.fetch_add(1, Ordering::SeqCst);
                })
                .await
                .unwrap();
        }

        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn remote_disconnect_uses_same_path() {
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_cb = Arc::clone(&fired);

        let mut session = RoomSession::connect(MockBackend::empty(), options(), None, move || {
            fired_cb.fetch_add(1, Ordering::SeqCst);
        })
        .await
        .unwrap();

        session.notify_remote_disconnected();
        session.disconnect();

        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn leave_removes_participant_server_side() {
        let backend = MockBackend::empty();
        let mut session =
            RoomSession::connect(Arc::clone(&backend) as Arc<dyn RoomBackend>, options(), None, || {})
                .await
                .unwrap();

        session.leave().await;

        assert!(!session.is_connected());
        assert_eq!(backend.removals.load(Ordering::SeqCst), 1);

        // Leaving again is a no-op
        session.leave().await;
        assert_eq!(backend.removals.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn refresh_fails_after_disconnect() {
        let mut session = RoomSession::connect(MockBackend::empty(), options(), None, || {})
            .await
            .unwrap();

        session.disconnect();
        assert!(session.refresh_participants().await.is_err());
    }
}
