//! Playback controller - the single playback session.
//!
//! Owns the one live [`AudioHandle`] and the session state machine. Every
//! `play()` takes a fresh epoch; when the speech request for an older epoch
//! resolves, its result is dropped. The transport is never cancelled.
//!
//! ```text
//!   play(id) ─▶ release old handle ─▶ Requesting ──(synthesize, decode, wav)──▶ Ready
//!                                          │                                     │
//!                                    stale epoch?                         load + start
//!                                          ▼                                     ▼
//!                                      Superseded                             Playing
//! ```
//!
//! All state transitions happen under one `std::sync::Mutex`; the lock is
//! never held across an `.await` and events are emitted after it is released.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use async_trait::async_trait;
use moonlit_core::{
    AudioHandle, AudioOutput, ConversationEvent, ConversationEventEmitter,
    DEFAULT_FALLBACK_SAMPLE_RATE, EndedCallback, MessageId, PlaybackError, PlaybackOutcome,
    PlaybackPort, PlaybackSession, PlaybackState, SpeechPort,
};

use crate::{pcm, wav};

/// Session plus the resource it owns.
#[derive(Debug, Default)]
struct Inner {
    session: PlaybackSession,
    handle: Option<AudioHandle>,
}

impl Inner {
    fn snapshot(&mut self) -> PlaybackSession {
        self.session.has_resource = self.handle.is_some();
        self.session.clone()
    }

    fn clear_active(&mut self, state: PlaybackState) {
        self.session.state = state;
        self.session.active_message_id = None;
        self.session.is_playing = false;
    }
}

/// Runs the speech pipeline and drives an [`AudioOutput`].
pub struct PlaybackController {
    speech: Arc<dyn SpeechPort>,
    output: Arc<dyn AudioOutput>,
    emitter: Arc<dyn ConversationEventEmitter>,
    fallback_sample_rate: u32,
    inner: Arc<Mutex<Inner>>,
}

impl PlaybackController {
    pub fn new(
        speech: Arc<dyn SpeechPort>,
        output: Arc<dyn AudioOutput>,
        emitter: Arc<dyn ConversationEventEmitter>,
    ) -> Self {
        Self {
            speech,
            output,
            emitter,
            fallback_sample_rate: DEFAULT_FALLBACK_SAMPLE_RATE,
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    /// Sample rate used when the speech backend does not report one.
    #[must_use]
    pub fn with_fallback_sample_rate(mut self, sample_rate: u32) -> Self {
        self.fallback_sample_rate = sample_rate;
        self
    }

    /// Synthesize, decode, and wrap `text` as a WAV container.
    async fn build_container(&self, text: &str) -> Result<Vec<u8>, PlaybackError> {
        let payload = self.speech.synthesize(text).await?;
        let samples = pcm::decode_base64(&payload.audio_base64)?;
        let sample_rate = payload
            .sample_rate
            .filter(|rate| *rate > 0)
            .unwrap_or(self.fallback_sample_rate);
        tracing::debug!(samples = samples.len(), sample_rate, "Speech decoded");
        Ok(wav::to_container(&samples, sample_rate, 1)?)
    }

    /// Begin a new epoch for `id`, releasing whatever resource is held.
    fn begin(&self, id: MessageId) -> u64 {
        let (epoch, snapshot) = {
            let mut inner = lock(&self.inner);
            if let Some(handle) = inner.handle.take() {
                self.output.halt(&handle);
                self.output.release(handle);
            }
            inner.session.epoch += 1;
            inner.session.state = PlaybackState::Requesting;
            inner.session.active_message_id = Some(id);
            inner.session.is_playing = false;
            inner.session.last_error = None;
            (inner.session.epoch, inner.snapshot())
        };
        tracing::debug!(message_id = %id, epoch, "Speech requested");
        self.publish(snapshot);
        epoch
    }

    /// Move a current-epoch session to `Ready`. `false` if superseded.
    fn mark_ready(&self, epoch: u64) -> bool {
        let snapshot = {
            let mut inner = lock(&self.inner);
            if inner.session.epoch != epoch {
                return false;
            }
            inner.session.state = PlaybackState::Ready;
            inner.snapshot()
        };
        self.publish(snapshot);
        true
    }

    /// Load and start the container for a current-epoch session.
    fn start_output(
        &self,
        id: MessageId,
        epoch: u64,
        container: Vec<u8>,
    ) -> Result<PlaybackOutcome, PlaybackError> {
        let mut inner = lock(&self.inner);
        if inner.session.epoch != epoch {
            return Ok(PlaybackOutcome::Superseded);
        }

        let started = self.output.load(container).and_then(|handle| {
            let result = self.output.start(&handle, self.ended_callback(id, epoch));
            inner.handle = Some(handle);
            result
        });

        if let Err(err) = started {
            return Err(self.fail(inner, id, err.into()));
        }

        inner.session.state = PlaybackState::Playing;
        inner.session.is_playing = true;
        let snapshot = inner.snapshot();
        drop(inner);

        tracing::info!(message_id = %id, epoch, "Playback started");
        self.publish(snapshot);
        Ok(PlaybackOutcome::Started)
    }

    /// Record a pipeline failure and release the lock.
    fn fail(
        &self,
        mut inner: MutexGuard<'_, Inner>,
        id: MessageId,
        err: PlaybackError,
    ) -> PlaybackError {
        if err.is_silent() {
            inner.clear_active(PlaybackState::Stopped);
            tracing::debug!(message_id = %id, "Playback aborted");
        } else {
            inner.clear_active(PlaybackState::Errored);
            inner.session.last_error = Some(err.user_message());
            tracing::warn!(message_id = %id, error = %err, "Playback failed");
        }
        let snapshot = inner.snapshot();
        drop(inner);

        self.publish(snapshot);
        err
    }

    fn ended_callback(&self, id: MessageId, epoch: u64) -> EndedCallback {
        let inner = Arc::downgrade(&self.inner);
        let emitter = Arc::clone(&self.emitter);
        Box::new(move || on_ended(&inner, emitter.as_ref(), id, epoch))
    }

    fn pause_active(&self, mut inner: MutexGuard<'_, Inner>) -> PlaybackOutcome {
        if let Some(handle) = &inner.handle {
            self.output.pause(handle);
        }
        inner.session.state = PlaybackState::Paused;
        inner.session.is_playing = false;
        let snapshot = inner.snapshot();
        drop(inner);

        self.publish(snapshot);
        PlaybackOutcome::Paused
    }

    fn resume_active(
        &self,
        mut inner: MutexGuard<'_, Inner>,
        id: MessageId,
    ) -> Result<PlaybackOutcome, PlaybackError> {
        let resumed = match &inner.handle {
            Some(handle) => self.output.resume(handle),
            None => Err(moonlit_core::OutputError::Aborted),
        };
        if let Err(err) = resumed {
            return Err(self.fail(inner, id, err.into()));
        }

        inner.session.state = PlaybackState::Playing;
        inner.session.is_playing = true;
        let snapshot = inner.snapshot();
        drop(inner);

        self.publish(snapshot);
        Ok(PlaybackOutcome::Resumed)
    }

    fn publish(&self, session: PlaybackSession) {
        self.emitter
            .emit(ConversationEvent::PlaybackChanged { session });
    }
}

#[async_trait]
impl PlaybackPort for PlaybackController {
    async fn play(&self, id: MessageId, text: &str) -> Result<PlaybackOutcome, PlaybackError> {
        let epoch = self.begin(id);

        let built = self.build_container(text).await;

        let container = match built {
            Ok(container) => container,
            Err(err) => {
                let inner = lock(&self.inner);
                if inner.session.epoch != epoch {
                    tracing::debug!(message_id = %id, epoch, "Discarding stale speech failure");
                    return Ok(PlaybackOutcome::Superseded);
                }
                return Err(self.fail(inner, id, err));
            }
        };

        if !self.mark_ready(epoch) {
            tracing::debug!(message_id = %id, epoch, "Discarding stale speech");
            return Ok(PlaybackOutcome::Superseded);
        }
        self.start_output(id, epoch, container)
    }

    async fn toggle(&self, id: MessageId, text: &str) -> Result<PlaybackOutcome, PlaybackError> {
        {
            let inner = lock(&self.inner);
            if inner.session.is_active_for(id) {
                match inner.session.state {
                    PlaybackState::Playing => return Ok(self.pause_active(inner)),
                    PlaybackState::Paused => return self.resume_active(inner, id),
                    PlaybackState::Requesting | PlaybackState::Ready => {
                        return Ok(PlaybackOutcome::Ignored);
                    }
                    PlaybackState::Idle | PlaybackState::Stopped | PlaybackState::Errored => {}
                }
            }
        }
        self.play(id, text).await
    }

    fn stop(&self) {
        let snapshot = {
            let mut inner = lock(&self.inner);
            if let Some(handle) = &inner.handle {
                self.output.halt(handle);
            }
            let session = &inner.session;
            if session.active_message_id.is_none() && !session.is_playing {
                if session.last_error.is_none() {
                    return;
                }
                // Nothing to halt; only dismiss the failure of an earlier play.
                inner.session.last_error = None;
                if inner.session.state == PlaybackState::Errored {
                    inner.session.state = PlaybackState::Idle;
                }
            } else {
                // Pending speech for this epoch must not start after a stop.
                inner.session.epoch += 1;
                inner.session.last_error = None;
                inner.clear_active(PlaybackState::Stopped);
            }
            inner.snapshot()
        };
        tracing::debug!("Playback stopped");
        self.publish(snapshot);
    }

    fn session(&self) -> PlaybackSession {
        lock(&self.inner).snapshot()
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        let handle = lock(&self.inner).handle.take();
        if let Some(handle) = handle {
            self.output.halt(&handle);
            self.output.release(handle);
        }
    }
}

/// Natural end of a clip: `Playing | Paused -> Idle` if the session still
/// belongs to it.
///
/// A clip can run out while paused when the output finishes draining after
/// the pause request.
fn on_ended(
    inner: &Weak<Mutex<Inner>>,
    emitter: &dyn ConversationEventEmitter,
    id: MessageId,
    epoch: u64,
) {
    let Some(inner) = inner.upgrade() else {
        return;
    };
    let snapshot = {
        let mut guard = lock(&inner);
        let session = &guard.session;
        if session.epoch != epoch
            || !session.is_active_for(id)
            || !matches!(
                session.state,
                PlaybackState::Playing | PlaybackState::Paused
            )
        {
            return;
        }
        guard.clear_active(PlaybackState::Idle);
        guard.snapshot()
    };
    tracing::debug!(message_id = %id, epoch, "Playback ended");
    emitter.emit(ConversationEvent::PlaybackChanged { session: snapshot });
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}
