//! State-machine tests for `PlaybackController` with fake speech and output.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use moonlit_core::{
    AudioHandle, AudioOutput, BackendError, ChannelEmitter, ConversationEvent, EndedCallback,
    MessageId, NoopEmitter, OutputError, PlaybackOutcome, PlaybackPort, PlaybackState,
    SpeechPayload, SpeechPort,
};
use moonlit_voice::{PlaybackController, WavHeader, pcm};
use tokio::sync::oneshot;

// ── Fakes ──────────────────────────────────────────────────────────

type SpeechResult = Result<SpeechPayload, BackendError>;

/// Speech backend whose replies can be held back per text.
#[derive(Default)]
struct GatedSpeech {
    gates: Mutex<HashMap<String, oneshot::Receiver<SpeechResult>>>,
    failures: Mutex<HashMap<String, BackendError>>,
    calls: Mutex<Vec<String>>,
}

impl GatedSpeech {
    /// Hold the reply for `text` until the returned sender fires.
    fn gate(&self, text: &str) -> oneshot::Sender<SpeechResult> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(text.to_string(), rx);
        tx
    }

    fn fail(&self, text: &str, err: BackendError) {
        self.failures.lock().unwrap().insert(text.to_string(), err);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

fn payload(samples: &[i16], sample_rate: Option<u32>) -> SpeechPayload {
    SpeechPayload {
        audio_base64: pcm::encode_base64(samples),
        sample_rate,
    }
}

#[async_trait]
impl SpeechPort for GatedSpeech {
    async fn synthesize(&self, text: &str) -> SpeechResult {
        self.calls.lock().unwrap().push(text.to_string());
        if let Some(err) = self.failures.lock().unwrap().remove(text) {
            return Err(err);
        }
        let gate = self.gates.lock().unwrap().remove(text);
        match gate {
            Some(rx) => rx.await.unwrap_or_else(|_| {
                Err(BackendError::Decode {
                    what: "gate",
                    reason: "dropped".to_string(),
                })
            }),
            None => Ok(payload(&[1, 2, 3, 4], Some(16_000))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Op {
    Load(u64),
    Start(u64),
    Pause(u64),
    Resume(u64),
    Halt(u64),
    Release(u64),
}

/// Output that records every call and lets the test end clips by hand.
#[derive(Default)]
struct RecordingOutput {
    ops: Mutex<Vec<Op>>,
    live: Mutex<HashSet<u64>>,
    containers: Mutex<Vec<Vec<u8>>>,
    callbacks: Mutex<HashMap<u64, EndedCallback>>,
    start_error: Mutex<Option<OutputError>>,
    next_id: Mutex<u64>,
}

impl RecordingOutput {
    fn reject_next_start(&self, err: OutputError) {
        *self.start_error.lock().unwrap() = Some(err);
    }

    fn ops(&self) -> Vec<Op> {
        self.ops.lock().unwrap().clone()
    }

    fn live_handles(&self) -> usize {
        self.live.lock().unwrap().len()
    }

    fn last_container(&self) -> Vec<u8> {
        self.containers.lock().unwrap().last().cloned().unwrap()
    }

    /// Simulate the clip draining. Returns false if no callback is pending.
    fn finish(&self, handle: u64) -> bool {
        let callback = self.callbacks.lock().unwrap().remove(&handle);
        callback.map(|cb| cb()).is_some()
    }
}

impl AudioOutput for RecordingOutput {
    fn load(&self, container: Vec<u8>) -> Result<AudioHandle, OutputError> {
        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            *next
        };
        self.containers.lock().unwrap().push(container);
        self.live.lock().unwrap().insert(id);
        self.ops.lock().unwrap().push(Op::Load(id));
        Ok(AudioHandle::new(id))
    }

    fn start(&self, handle: &AudioHandle, on_ended: EndedCallback) -> Result<(), OutputError> {
        self.ops.lock().unwrap().push(Op::Start(handle.id()));
        if let Some(err) = self.start_error.lock().unwrap().take() {
            return Err(err);
        }
        self.callbacks.lock().unwrap().insert(handle.id(), on_ended);
        Ok(())
    }

    fn pause(&self, handle: &AudioHandle) {
        self.ops.lock().unwrap().push(Op::Pause(handle.id()));
    }

    fn resume(&self, handle: &AudioHandle) -> Result<(), OutputError> {
        self.ops.lock().unwrap().push(Op::Resume(handle.id()));
        Ok(())
    }

    fn halt(&self, handle: &AudioHandle) {
        self.ops.lock().unwrap().push(Op::Halt(handle.id()));
        self.callbacks.lock().unwrap().remove(&handle.id());
    }

    fn release(&self, handle: AudioHandle) {
        self.ops.lock().unwrap().push(Op::Release(handle.id()));
        self.live.lock().unwrap().remove(&handle.id());
        self.callbacks.lock().unwrap().remove(&handle.id());
    }
}

struct Harness {
    speech: Arc<GatedSpeech>,
    output: Arc<RecordingOutput>,
    controller: Arc<PlaybackController>,
}

fn harness() -> Harness {
    let speech = Arc::new(GatedSpeech::default());
    let output = Arc::new(RecordingOutput::default());
    let controller = Arc::new(
        PlaybackController::new(speech.clone(), output.clone(), Arc::new(NoopEmitter))
            .with_fallback_sample_rate(22_050),
    );
    Harness {
        speech,
        output,
        controller,
    }
}

const A: MessageId = MessageId::new(1);
const B: MessageId = MessageId::new(2);

/// Let spawned tasks run until they block on their gates.
async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

// ── Tests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn play_starts_output_and_reports_playing() {
    let h = harness();

    let outcome = h.controller.play(A, "hello").await.unwrap();

    assert_eq!(outcome, PlaybackOutcome::Started);
    let session = h.controller.session();
    assert_eq!(session.state, PlaybackState::Playing);
    assert_eq!(session.active_message_id, Some(A));
    assert!(session.is_playing);
    assert!(session.has_resource);
    assert_eq!(h.output.ops(), vec![Op::Load(1), Op::Start(1)]);
}

#[tokio::test]
async fn later_play_wins_when_earlier_speech_resolves_late() {
    let h = harness();
    let gate_a = h.speech.gate("first");

    let controller = Arc::clone(&h.controller);
    let pending_a = tokio::spawn(async move { controller.play(A, "first").await });
    settle().await;
    assert_eq!(h.controller.session().state, PlaybackState::Requesting);

    let outcome_b = h.controller.play(B, "second").await.unwrap();
    assert_eq!(outcome_b, PlaybackOutcome::Started);

    gate_a
        .send(Ok(payload(&[9, 9, 9, 9], Some(8_000))))
        .unwrap();
    let outcome_a = pending_a.await.unwrap().unwrap();

    assert_eq!(outcome_a, PlaybackOutcome::Superseded);
    let session = h.controller.session();
    assert_eq!(session.active_message_id, Some(B));
    assert_eq!(session.state, PlaybackState::Playing);
    assert_eq!(h.output.ops(), vec![Op::Load(1), Op::Start(1)]);
    assert_eq!(h.output.live_handles(), 1);
}

#[tokio::test]
async fn stale_failure_does_not_touch_newer_session() {
    let h = harness();
    let gate_a = h.speech.gate("first");

    let controller = Arc::clone(&h.controller);
    let pending_a = tokio::spawn(async move { controller.play(A, "first").await });
    settle().await;

    h.controller.play(B, "second").await.unwrap();
    gate_a
        .send(Err(BackendError::Http {
            endpoint: "tts".to_string(),
            status: 500,
            body: String::new(),
        }))
        .unwrap();

    assert_eq!(
        pending_a.await.unwrap().unwrap(),
        PlaybackOutcome::Superseded
    );
    let session = h.controller.session();
    assert_eq!(session.state, PlaybackState::Playing);
    assert_eq!(session.last_error, None);
}

#[tokio::test]
async fn replacing_a_session_releases_the_old_handle_first() {
    let h = harness();

    h.controller.play(A, "first").await.unwrap();
    h.controller.play(B, "second").await.unwrap();

    assert_eq!(
        h.output.ops(),
        vec![
            Op::Load(1),
            Op::Start(1),
            Op::Halt(1),
            Op::Release(1),
            Op::Load(2),
            Op::Start(2),
        ]
    );
    assert_eq!(h.output.live_handles(), 1);
}

#[tokio::test]
async fn stop_is_idempotent() {
    let h = harness();
    h.controller.play(A, "hello").await.unwrap();

    h.controller.stop();
    let first = h.controller.session();
    h.controller.stop();
    let second = h.controller.session();

    assert_eq!(first, second);
    assert_eq!(first.state, PlaybackState::Stopped);
    assert_eq!(first.active_message_id, None);
    assert!(!first.is_playing);
    // The handle is kept until it is replaced.
    assert!(first.has_resource);
    assert_eq!(h.output.live_handles(), 1);
}

#[tokio::test]
async fn stop_on_idle_controller_changes_nothing() {
    let h = harness();
    let before = h.controller.session();

    h.controller.stop();

    assert_eq!(h.controller.session(), before);
    assert!(h.output.ops().is_empty());
}

#[tokio::test]
async fn stop_dismisses_a_previous_failure() {
    let h = harness();
    h.speech.fail(
        "hello",
        BackendError::Http {
            endpoint: "tts".to_string(),
            status: 503,
            body: "busy".to_string(),
        },
    );
    h.controller.play(A, "hello").await.unwrap_err();
    assert!(h.controller.session().last_error.is_some());

    h.controller.stop();
    let first = h.controller.session();
    h.controller.stop();

    assert_eq!(first.last_error, None);
    assert_eq!(first.state, PlaybackState::Idle);
    assert_eq!(first.active_message_id, None);
    assert_eq!(h.controller.session(), first);
    assert!(h.output.ops().is_empty());
}

#[tokio::test]
async fn stop_while_requesting_discards_the_pending_speech() {
    let h = harness();
    let gate = h.speech.gate("hello");

    let controller = Arc::clone(&h.controller);
    let pending = tokio::spawn(async move { controller.play(A, "hello").await });
    settle().await;

    h.controller.stop();
    gate.send(Ok(payload(&[1, 1], None))).unwrap();

    assert_eq!(pending.await.unwrap().unwrap(), PlaybackOutcome::Superseded);
    assert_eq!(h.controller.session().state, PlaybackState::Stopped);
    assert_eq!(h.output.live_handles(), 0);
}

#[tokio::test]
async fn toggle_pauses_then_resumes_the_active_message() {
    let h = harness();

    assert_eq!(
        h.controller.toggle(A, "hello").await.unwrap(),
        PlaybackOutcome::Started
    );

    assert_eq!(
        h.controller.toggle(A, "hello").await.unwrap(),
        PlaybackOutcome::Paused
    );
    let paused = h.controller.session();
    assert_eq!(paused.state, PlaybackState::Paused);
    assert!(!paused.is_playing);
    assert!(paused.has_resource);
    assert_eq!(paused.active_message_id, Some(A));

    assert_eq!(
        h.controller.toggle(A, "hello").await.unwrap(),
        PlaybackOutcome::Resumed
    );
    assert!(h.controller.session().is_playing);

    assert_eq!(
        h.output.ops(),
        vec![Op::Load(1), Op::Start(1), Op::Pause(1), Op::Resume(1)]
    );
    assert_eq!(h.speech.calls().len(), 1);
}

#[tokio::test]
async fn toggle_on_another_message_plays_it() {
    let h = harness();
    h.controller.play(A, "first").await.unwrap();

    let outcome = h.controller.toggle(B, "second").await.unwrap();

    assert_eq!(outcome, PlaybackOutcome::Started);
    assert_eq!(h.controller.session().active_message_id, Some(B));
    assert_eq!(h.speech.calls(), vec!["first", "second"]);
}

#[tokio::test]
async fn toggle_while_loading_is_ignored() {
    let h = harness();
    let gate = h.speech.gate("hello");

    let controller = Arc::clone(&h.controller);
    let pending = tokio::spawn(async move { controller.play(A, "hello").await });
    settle().await;

    assert_eq!(
        h.controller.toggle(A, "hello").await.unwrap(),
        PlaybackOutcome::Ignored
    );

    gate.send(Ok(payload(&[1, 1], None))).unwrap();
    assert_eq!(pending.await.unwrap().unwrap(), PlaybackOutcome::Started);
    assert_eq!(h.speech.calls().len(), 1);
}

#[tokio::test]
async fn natural_end_returns_to_idle() {
    let h = harness();
    h.controller.play(A, "hello").await.unwrap();

    assert!(h.output.finish(1));

    let session = h.controller.session();
    assert_eq!(session.state, PlaybackState::Idle);
    assert_eq!(session.active_message_id, None);
    assert!(!session.is_playing);
}

#[tokio::test]
async fn clip_ending_while_paused_returns_to_idle() {
    let h = harness();
    h.controller.play(A, "hello").await.unwrap();
    assert_eq!(
        h.controller.toggle(A, "hello").await.unwrap(),
        PlaybackOutcome::Paused
    );

    assert!(h.output.finish(1));

    let session = h.controller.session();
    assert_eq!(session.state, PlaybackState::Idle);
    assert_eq!(session.active_message_id, None);
    assert!(!session.is_playing);

    // The drained clip cannot be resumed; toggling speaks the message again.
    assert_eq!(
        h.controller.toggle(A, "hello").await.unwrap(),
        PlaybackOutcome::Started
    );
    let session = h.controller.session();
    assert_eq!(session.state, PlaybackState::Playing);
    assert_eq!(session.active_message_id, Some(A));
    assert_eq!(h.speech.calls().len(), 2);
    assert!(!h.output.ops().contains(&Op::Resume(1)));
    assert_eq!(h.output.live_handles(), 1);
}

#[tokio::test]
async fn policy_rejection_is_reported_with_guidance() {
    let h = harness();
    h.output.reject_next_start(OutputError::Policy {
        reason: "autoplay".to_string(),
    });

    let err = h.controller.play(A, "hello").await.unwrap_err();

    assert!(err.reached_output());
    let session = h.controller.session();
    assert_eq!(session.state, PlaybackState::Errored);
    assert_eq!(session.active_message_id, None);
    assert!(!session.is_playing);
    assert!(
        session
            .last_error
            .unwrap()
            .contains("Interact with the app")
    );
}

#[tokio::test]
async fn aborted_start_is_swallowed() {
    let h = harness();
    h.output.reject_next_start(OutputError::Aborted);

    let err = h.controller.play(A, "hello").await.unwrap_err();

    assert!(err.is_silent());
    let session = h.controller.session();
    assert_eq!(session.state, PlaybackState::Stopped);
    assert_eq!(session.last_error, None);
}

#[tokio::test]
async fn speech_failure_marks_session_errored() {
    let h = harness();
    h.speech.fail(
        "hello",
        BackendError::Http {
            endpoint: "tts".to_string(),
            status: 500,
            body: "boom".to_string(),
        },
    );

    let err = h.controller.play(A, "hello").await.unwrap_err();

    assert!(!err.reached_output());
    let session = h.controller.session();
    assert_eq!(session.state, PlaybackState::Errored);
    assert!(session.last_error.unwrap().starts_with("Speech failed"));
    assert!(h.output.ops().is_empty());
}

#[tokio::test]
async fn malformed_audio_is_a_decode_failure() {
    let h = harness();
    let gate = h.speech.gate("hello");
    gate.send(Ok(SpeechPayload {
        audio_base64: "@@@".to_string(),
        sample_rate: None,
    }))
    .unwrap();

    let err = h.controller.play(A, "hello").await.unwrap_err();

    assert!(matches!(
        err,
        moonlit_core::PlaybackError::Backend(BackendError::Decode { .. })
    ));
    assert_eq!(h.controller.session().state, PlaybackState::Errored);
}

#[tokio::test]
async fn sample_rate_comes_from_backend_or_fallback() {
    let h = harness();

    h.controller.play(A, "reported").await.unwrap();
    let reported = WavHeader::parse(&h.output.last_container()).unwrap();
    assert_eq!(reported.sample_rate, 16_000);

    let gate = h.speech.gate("unreported");
    gate.send(Ok(payload(&[0; 4], None))).unwrap();
    h.controller.play(B, "unreported").await.unwrap();
    let fallback = WavHeader::parse(&h.output.last_container()).unwrap();
    assert_eq!(fallback.sample_rate, 22_050);
}

#[tokio::test]
async fn dropping_the_controller_releases_the_handle() {
    let h = harness();
    h.controller.play(A, "hello").await.unwrap();
    assert_eq!(h.output.live_handles(), 1);

    drop(h.controller);

    assert_eq!(h.output.live_handles(), 0);
}

#[tokio::test]
async fn session_changes_are_emitted_in_order() {
    let speech = Arc::new(GatedSpeech::default());
    let output = Arc::new(RecordingOutput::default());
    let (emitter, mut rx) = ChannelEmitter::new();
    let controller = PlaybackController::new(speech, output, Arc::new(emitter));

    controller.play(A, "hello").await.unwrap();

    let mut states = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let ConversationEvent::PlaybackChanged { session } = event {
            states.push(session.state);
        }
    }
    assert_eq!(
        states,
        vec![
            PlaybackState::Requesting,
            PlaybackState::Ready,
            PlaybackState::Playing
        ]
    );
}
