//! Speech playback for moonlit.
//!
//! The speech pipeline for one message is:
//!
//! ```text
//!   SpeechPort::synthesize ─▶ pcm::decode_base64 ─▶ wav::to_container ─▶ AudioOutput
//! ```
//!
//! [`PlaybackController`] runs that pipeline, owns the single audio resource
//! handle, and implements the core's `PlaybackPort`. Outputs:
//!
//! - [`SilentOutput`] simulates playback with timers (headless runs, tests).
//! - `SpeakerOutput` plays through the default device via rodio (feature `speaker`).

#![deny(unused_crate_dependencies)]

pub mod controller;
pub mod error;
pub mod output;
pub mod pcm;
pub mod wav;

// Re-export key types for convenience
pub use controller::PlaybackController;
pub use error::VoiceError;
#[cfg(feature = "speaker")]
pub use output::SpeakerOutput;
pub use output::{SilentOutput, select_output};
pub use wav::WavHeader;

// Silence unused dev-dependency warnings
#[cfg(test)]
use tokio as _;
