//! Speaker output via `rodio`, confined to a dedicated audio thread.
//!
//! `rodio::OutputStream` is `!Send` on some platforms. The stream and every
//! `Sink` live on one OS thread; [`SpeakerOutput`] is the `Send + Sync` proxy
//! that forwards each [`AudioOutput`] call as an [`AudioCommand`].

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;

use moonlit_core::{AudioHandle, AudioOutput, EndedCallback, OutputError};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

use crate::error::VoiceError;

// ── Commands ───────────────────────────────────────────────────────

enum AudioCommand {
    Load {
        container: Vec<u8>,
        reply: mpsc::Sender<Result<u64, OutputError>>,
    },
    Start {
        id: u64,
        on_ended: EndedCallback,
        reply: mpsc::Sender<Result<(), OutputError>>,
    },
    Pause {
        id: u64,
    },
    Resume {
        id: u64,
        reply: mpsc::Sender<Result<(), OutputError>>,
    },
    Halt {
        id: u64,
    },
    Release {
        id: u64,
    },
    Shutdown,
}

// ── Handle (Send + Sync proxy) ─────────────────────────────────────

/// Plays WAV containers on the default output device.
pub struct SpeakerOutput {
    cmd_tx: mpsc::Sender<AudioCommand>,
    thread: Option<thread::JoinHandle<()>>,
}

impl SpeakerOutput {
    /// Spawn the audio thread and open the default device.
    pub fn new() -> Result<Self, VoiceError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (init_tx, init_rx) = mpsc::channel();

        let thread = thread::Builder::new()
            .name("moonlit-audio".into())
            .spawn(move || run(&cmd_rx, &init_tx))
            .map_err(|e| VoiceError::ThreadSpawn(e.to_string()))?;

        init_rx.recv().map_err(|_| VoiceError::AudioThreadDied)??;
        tracing::info!("Audio output initialized on default device");

        Ok(Self {
            cmd_tx,
            thread: Some(thread),
        })
    }

    fn send(&self, cmd: AudioCommand) -> bool {
        self.cmd_tx.send(cmd).is_ok()
    }

    fn send_and_recv<T>(
        &self,
        build: impl FnOnce(mpsc::Sender<Result<T, OutputError>>) -> AudioCommand,
    ) -> Result<T, OutputError> {
        let (tx, rx) = mpsc::channel();
        if !self.send(build(tx)) {
            return Err(thread_died());
        }
        rx.recv().map_err(|_| thread_died())?
    }
}

impl AudioOutput for SpeakerOutput {
    fn load(&self, container: Vec<u8>) -> Result<AudioHandle, OutputError> {
        self.send_and_recv(|reply| AudioCommand::Load { container, reply })
            .map(AudioHandle::new)
    }

    fn start(&self, handle: &AudioHandle, on_ended: EndedCallback) -> Result<(), OutputError> {
        self.send_and_recv(|reply| AudioCommand::Start {
            id: handle.id(),
            on_ended,
            reply,
        })
    }

    fn pause(&self, handle: &AudioHandle) {
        self.send(AudioCommand::Pause { id: handle.id() });
    }

    fn resume(&self, handle: &AudioHandle) -> Result<(), OutputError> {
        self.send_and_recv(|reply| AudioCommand::Resume {
            id: handle.id(),
            reply,
        })
    }

    fn halt(&self, handle: &AudioHandle) {
        self.send(AudioCommand::Halt { id: handle.id() });
    }

    fn release(&self, handle: AudioHandle) {
        self.send(AudioCommand::Release { id: handle.id() });
    }
}

impl Drop for SpeakerOutput {
    fn drop(&mut self) {
        self.send(AudioCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn thread_died() -> OutputError {
    OutputError::Failed {
        reason: "audio thread is not running".to_string(),
    }
}

// ── Audio thread ───────────────────────────────────────────────────

/// One loaded clip. The container is kept so a halt can rewind by rebuilding
/// the sink.
struct Track {
    container: Arc<[u8]>,
    sink: Arc<Sink>,
    /// Set while a completion watcher may still fire the ended callback.
    armed: Arc<AtomicBool>,
}

fn paused_sink(stream: &OutputStreamHandle, container: &Arc<[u8]>) -> Result<Sink, OutputError> {
    let sink = Sink::try_new(stream).map_err(|e| OutputError::Failed {
        reason: e.to_string(),
    })?;
    let source =
        Decoder::new(Cursor::new(Arc::clone(container))).map_err(|e| OutputError::Failed {
            reason: format!("unreadable audio: {e}"),
        })?;
    sink.pause();
    sink.append(source);
    Ok(sink)
}

fn run(cmd_rx: &mpsc::Receiver<AudioCommand>, init_tx: &mpsc::Sender<Result<(), VoiceError>>) {
    let (_stream, stream_handle) = match OutputStream::try_default() {
        Ok(pair) => pair,
        Err(e) => {
            let _ = init_tx.send(Err(VoiceError::NoOutputDevice(e.to_string())));
            return;
        }
    };
    if init_tx.send(Ok(())).is_err() {
        return;
    }

    let mut tracks: HashMap<u64, Track> = HashMap::new();
    let mut next_id: u64 = 0;

    while let Ok(cmd) = cmd_rx.recv() {
        match cmd {
            AudioCommand::Load { container, reply } => {
                let container: Arc<[u8]> = container.into();
                let result = paused_sink(&stream_handle, &container).map(|sink| {
                    next_id += 1;
                    tracks.insert(
                        next_id,
                        Track {
                            container,
                            sink: Arc::new(sink),
                            armed: Arc::new(AtomicBool::new(false)),
                        },
                    );
                    next_id
                });
                let _ = reply.send(result);
            }

            AudioCommand::Start {
                id,
                on_ended,
                reply,
            } => {
                let result = tracks.get(&id).map_or(Err(OutputError::Aborted), |track| {
                    track.armed.store(true, Ordering::SeqCst);
                    track.sink.play();
                    spawn_completion_watcher(id, track, on_ended);
                    Ok(())
                });
                let _ = reply.send(result);
            }

            AudioCommand::Pause { id } => {
                if let Some(track) = tracks.get(&id) {
                    track.sink.pause();
                }
            }

            AudioCommand::Resume { id, reply } => {
                let result = tracks.get(&id).map_or(Err(OutputError::Aborted), |track| {
                    track.sink.play();
                    Ok(())
                });
                let _ = reply.send(result);
            }

            AudioCommand::Halt { id } => {
                if let Some(track) = tracks.get_mut(&id) {
                    track.armed.store(false, Ordering::SeqCst);
                    track.sink.stop();
                    match paused_sink(&stream_handle, &track.container) {
                        Ok(sink) => track.sink = Arc::new(sink),
                        Err(e) => tracing::warn!(handle = id, error = %e, "Failed to rewind clip"),
                    }
                }
            }

            AudioCommand::Release { id } => {
                if let Some(track) = tracks.remove(&id) {
                    track.armed.store(false, Ordering::SeqCst);
                    track.sink.stop();
                }
            }

            AudioCommand::Shutdown => break,
        }
    }

    for track in tracks.values() {
        track.armed.store(false, Ordering::SeqCst);
        track.sink.stop();
    }
    tracing::debug!("Audio thread exiting");
}

/// Block on the sink in a helper thread; fire `on_ended` only on natural drain.
fn spawn_completion_watcher(id: u64, track: &Track, on_ended: EndedCallback) {
    let sink = Arc::clone(&track.sink);
    let armed = Arc::clone(&track.armed);

    // `stop()` empties the queue, which makes `sleep_until_end` return early;
    // the armed flag tells the two cases apart.
    thread::spawn(move || {
        sink.sleep_until_end();
        if armed.swap(false, Ordering::SeqCst) {
            tracing::debug!(handle = id, "Playback finished naturally");
            on_ended();
        }
    });
}
