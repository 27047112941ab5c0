//! Voice crate error types.

/// Errors raised while setting up an audio output.
///
/// Per-clip failures are reported through `OutputError` from the core; this
/// type only covers the device itself.
#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    /// No audio output device could be opened.
    #[error("No audio output device available: {0}")]
    NoOutputDevice(String),

    /// The audio thread could not be spawned.
    #[error("Failed to start audio thread: {0}")]
    ThreadSpawn(String),

    /// The audio thread exited unexpectedly.
    #[error("Audio thread died unexpectedly")]
    AudioThreadDied,
}
