//! Audio capture/playback bridge
//!
//! Records the local microphone into discrete chunks on demand and plays
//! back synthesized responses. Speech processing happens elsewhere — this
//! module only moves samples.

mod capture;
mod playback;
mod recorder;

pub use capture::{MicCapture, SAMPLE_RATE, samples_to_wav};
pub use playback::{Playback, play_mp3_detached};
pub use recorder::{Recorder, RecorderState, SampleSource};
