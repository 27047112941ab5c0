//! `AudioOutput` implementations.

mod silent;
#[cfg(feature = "speaker")]
mod speaker;

use std::sync::Arc;

use moonlit_core::AudioOutput;

pub use silent::SilentOutput;
#[cfg(feature = "speaker")]
pub use speaker::SpeakerOutput;

/// Pick the output for this run.
///
/// With `want_speaker` and the `speaker` feature, the default device is
/// opened; if that fails (or the feature is off) playback falls back to
/// [`SilentOutput`] so the conversation still works.
pub fn select_output(want_speaker: bool) -> Arc<dyn AudioOutput> {
    if want_speaker {
        #[cfg(feature = "speaker")]
        {
            match SpeakerOutput::new() {
                Ok(output) => return Arc::new(output),
                Err(e) => {
                    tracing::warn!(error = %e, "Audio device unavailable, using silent output");
                }
            }
        }
        #[cfg(not(feature = "speaker"))]
        {
            tracing::info!("Built without speaker support, using silent output");
        }
    }
    Arc::new(SilentOutput::new())
}
