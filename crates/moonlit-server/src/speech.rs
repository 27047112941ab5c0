//! Speech engine port and the silent placeholder engine.

use std::time::Duration;

use async_trait::async_trait;

/// Mono 16-bit PCM produced by an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedSpeech {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
}

/// Text-to-speech engine.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Synthesize `text` in `voice`.
    async fn synthesize(&self, text: &str, voice: &str) -> anyhow::Result<SynthesizedSpeech>;
}

/// Engine that returns a fixed-length silent clip for any text.
#[derive(Debug, Clone)]
pub struct SilentSpeech {
    sample_rate: u32,
    clip: Duration,
}

impl SilentSpeech {
    pub const fn new(sample_rate: u32, clip: Duration) -> Self {
        Self { sample_rate, clip }
    }

    /// Number of samples in one clip.
    pub fn clip_samples(&self) -> usize {
        let samples = u128::from(self.sample_rate) * self.clip.as_millis() / 1000;
        usize::try_from(samples).unwrap_or(usize::MAX)
    }
}

#[async_trait]
impl SpeechEngine for SilentSpeech {
    async fn synthesize(&self, _text: &str, _voice: &str) -> anyhow::Result<SynthesizedSpeech> {
        Ok(SynthesizedSpeech {
            samples: vec![0; self.clip_samples()],
            sample_rate: self.sample_rate,
        })
    }
}
