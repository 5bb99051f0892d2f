//! Recording state machine over a sample source

use crate::{Error, Result};

use super::capture::samples_to_wav;

/// Source of captured audio samples
///
/// Implemented by [`super::MicCapture`]; tests substitute a scripted source
/// so the state machine runs without audio hardware.
pub trait SampleSource {
    /// Whether the capture device handle is open (stream running)
    fn is_open(&self) -> bool;

    /// Take all samples accumulated since the last drain
    fn drain(&mut self) -> Vec<f32>;

    /// Discard accumulated samples
    fn clear(&mut self);

    /// Sample rate of the drained samples
    fn sample_rate(&self) -> u32;
}

/// Recorder lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    /// Not recording; ready for a start command
    Idle,
    /// Accumulating one recording span
    Recording,
    /// Span finalized, waiting on the assistant relay to resolve
    Processing,
}

/// Records discrete spans of audio from a sample source
///
/// Transitions: `Idle → Recording` on start (device must be open),
/// `Recording → Processing` on stop (finalizes one WAV blob),
/// `Processing → Idle` on finish. Start commands outside `Idle` are ignored.
pub struct Recorder<S: SampleSource> {
    source: S,
    state: RecorderState,
}

impl<S: SampleSource> Recorder<S> {
    /// Wrap a sample source in an idle recorder
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: RecorderState::Idle,
        }
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> RecorderState {
        self.state
    }

    /// Access the underlying source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access to the underlying source
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Begin a recording span
    ///
    /// A no-op while already recording or processing — the span in flight
    /// keeps accumulating undisturbed.
    ///
    /// # Errors
    ///
    /// Returns error if the capture device handle is not open
    pub fn start_recording(&mut self) -> Result<()> {
        match self.state {
            RecorderState::Idle => {
                if !self.source.is_open() {
                    return Err(Error::Audio("capture device not open".to_string()));
                }
                self.source.clear();
                self.state = RecorderState::Recording;
                tracing::debug!("recording started");
                Ok(())
            }
            RecorderState::Recording => {
                tracing::debug!("start ignored, already recording");
                Ok(())
            }
            RecorderState::Processing => {
                tracing::debug!("start ignored, still processing");
                Ok(())
            }
        }
    }

    /// End the recording span and finalize it into one WAV blob
    ///
    /// Returns `None` when no recording is in progress.
    ///
    /// # Errors
    ///
    /// Returns error if WAV encoding fails
    pub fn stop_recording(&mut self) -> Result<Option<Vec<u8>>> {
        if self.state != RecorderState::Recording {
            return Ok(None);
        }

        let samples = self.source.drain();
        let wav = samples_to_wav(&samples, self.source.sample_rate())?;
        self.state = RecorderState::Processing;

        tracing::debug!(samples = samples.len(), bytes = wav.len(), "recording finalized");
        Ok(Some(wav))
    }

    /// Mark the in-flight relay request resolved (success or failure)
    pub fn finish(&mut self) {
        if self.state == RecorderState::Processing {
            self.state = RecorderState::Idle;
        }
    }
}
