//! Timer-driven output that plays nothing.
//!
//! Each clip's length is read from its WAV header; `start`/`resume` arm a
//! timer thread for the remaining time and the ended callback fires when it
//! runs out. Pausing, halting, or releasing bumps the clip's run counter so
//! any armed timer finds itself stale and exits quietly.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use moonlit_core::{AudioHandle, AudioOutput, EndedCallback, OutputError};

use crate::wav::WavHeader;

struct Clip {
    duration: Duration,
    position: Duration,
    started_at: Option<Instant>,
    run: u64,
    on_ended: Option<EndedCallback>,
}

impl Clip {
    fn remaining(&self) -> Duration {
        self.duration.saturating_sub(self.position)
    }
}

type Clips = Arc<Mutex<HashMap<u64, Clip>>>;

/// Output for headless runs: same timing as a real device, no sound.
#[derive(Default)]
pub struct SilentOutput {
    next_id: AtomicU64,
    clips: Clips,
}

impl SilentOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of loaded, unreleased clips.
    pub fn live_handles(&self) -> usize {
        lock(&self.clips).len()
    }

    /// Whether the clip is currently running.
    pub fn is_running(&self, handle: &AudioHandle) -> bool {
        lock(&self.clips)
            .get(&handle.id())
            .is_some_and(|clip| clip.started_at.is_some())
    }

    fn arm(&self, id: u64, clip: &mut Clip) {
        clip.run += 1;
        clip.started_at = Some(Instant::now());

        let run = clip.run;
        let remaining = clip.remaining();
        let clips = Arc::clone(&self.clips);
        thread::spawn(move || {
            thread::sleep(remaining);

            let callback = {
                let mut guard = lock(&clips);
                let Some(clip) = guard.get_mut(&id) else {
                    return;
                };
                if clip.run != run || clip.started_at.is_none() {
                    return;
                }
                clip.started_at = None;
                clip.position = clip.duration;
                clip.on_ended.take()
            };

            tracing::debug!(handle = id, "Silent clip finished");
            if let Some(callback) = callback {
                callback();
            }
        });
    }
}

impl AudioOutput for SilentOutput {
    fn load(&self, container: Vec<u8>) -> Result<AudioHandle, OutputError> {
        let header = WavHeader::parse(&container).ok_or_else(|| OutputError::Failed {
            reason: "audio is not a PCM WAV container".to_string(),
        })?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        lock(&self.clips).insert(
            id,
            Clip {
                duration: header.duration(),
                position: Duration::ZERO,
                started_at: None,
                run: 0,
                on_ended: None,
            },
        );
        tracing::debug!(handle = id, duration = ?header.duration(), "Silent clip loaded");
        Ok(AudioHandle::new(id))
    }

    fn start(&self, handle: &AudioHandle, on_ended: EndedCallback) -> Result<(), OutputError> {
        let mut clips = lock(&self.clips);
        let clip = clips.get_mut(&handle.id()).ok_or(OutputError::Aborted)?;
        clip.on_ended = Some(on_ended);
        clip.position = Duration::ZERO;
        self.arm(handle.id(), clip);
        Ok(())
    }

    fn pause(&self, handle: &AudioHandle) {
        let mut clips = lock(&self.clips);
        if let Some(clip) = clips.get_mut(&handle.id()) {
            if let Some(started_at) = clip.started_at.take() {
                clip.position = (clip.position + started_at.elapsed()).min(clip.duration);
                clip.run += 1;
            }
        }
    }

    fn resume(&self, handle: &AudioHandle) -> Result<(), OutputError> {
        let mut clips = lock(&self.clips);
        let clip = clips.get_mut(&handle.id()).ok_or(OutputError::Aborted)?;
        if clip.started_at.is_none() && clip.on_ended.is_some() {
            self.arm(handle.id(), clip);
        }
        Ok(())
    }

    fn halt(&self, handle: &AudioHandle) {
        let mut clips = lock(&self.clips);
        if let Some(clip) = clips.get_mut(&handle.id()) {
            clip.started_at = None;
            clip.position = Duration::ZERO;
            clip.on_ended = None;
            clip.run += 1;
        }
    }

    fn release(&self, handle: AudioHandle) {
        lock(&self.clips).remove(&handle.id());
        tracing::debug!(handle = handle.id(), "Silent clip released");
    }
}

fn lock(clips: &Clips) -> MutexGuard<'_, HashMap<u64, Clip>> {
    clips.lock().unwrap_or_else(PoisonError::into_inner)
}
