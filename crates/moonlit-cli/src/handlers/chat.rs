//! Chat command handler.
//!
//! Wires the HTTP client, the playback controller, and the orchestrator,
//! then runs a rustyline prompt as the view: input lines become intents and
//! a background task prints the core's events as they arrive.

use std::sync::Arc;

use anyhow::{Context, Result};
use moonlit_core::{
    AudioOutput, ChannelEmitter, ClientSettings, ConversationError, ConversationEvent,
    ConversationEventEmitter, ConversationOrchestrator, MessageId, PlaybackOutcome, SpeechPort,
};
use moonlit_http::{BackendClient, HttpTransport};
use moonlit_voice::{PlaybackController, select_output};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

use crate::commands::ChatArgs;
use crate::presentation::{EventRenderer, format_message, format_session};
use crate::repl::{self, HELP, ReplCommand};

const PROMPT: &str = "you> ";

/// Build the conversation stack over `client` and `output`.
///
/// Returns the orchestrator and the event stream the view should drain.
pub fn assemble<T: HttpTransport + 'static>(
    client: BackendClient<T>,
    output: Arc<dyn AudioOutput>,
    settings: &ClientSettings,
) -> (
    ConversationOrchestrator,
    UnboundedReceiver<ConversationEvent>,
) {
    let (emitter, events) = ChannelEmitter::new();
    let emitter: Arc<dyn ConversationEventEmitter> = Arc::new(emitter);
    let client = Arc::new(client);

    let playback = PlaybackController::new(
        Arc::clone(&client) as Arc<dyn SpeechPort>,
        output,
        Arc::clone(&emitter),
    )
    .with_fallback_sample_rate(settings.fallback_sample_rate);
    let orchestrator = ConversationOrchestrator::new(client, Arc::new(playback), emitter)
        .with_auto_speak(settings.auto_speak);

    (orchestrator, events)
}

/// Execute the chat command.
pub async fn execute(args: &ChatArgs) -> Result<()> {
    let settings = args.to_settings().context("Invalid chat settings")?;
    let client =
        BackendClient::from_settings(&settings).context("Failed to build the backend client")?;
    let output = select_output(!args.no_audio);

    tracing::info!(
        chat = %settings.chat_url(),
        tts = %settings.tts_url(),
        voice = %settings.voice_name,
        auto_speak = settings.auto_speak,
        "Starting chat session"
    );

    let (orchestrator, events) = assemble(client, output, &settings);
    let renderer = spawn_renderer(events);

    let mut editor = DefaultEditor::new()?;
    orchestrator.append_system(&format!(
        "Connected to {}. Type /help for commands.",
        settings.backend_url
    ));

    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                let command = match repl::parse(&line) {
                    Ok(command) => command,
                    Err(e) => {
                        eprintln!("{e}");
                        continue;
                    }
                };
                if command == ReplCommand::Empty {
                    continue;
                }
                let _ = editor.add_history_entry(line.trim());
                if command == ReplCommand::Quit {
                    break;
                }
                dispatch(&orchestrator, command).await;
            }
            Err(ReadlineError::Interrupted) => {
                orchestrator.stop_audio();
                println!("(Ctrl-C: playback stopped, /quit to leave)");
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err).context("Failed to read input"),
        }
    }

    orchestrator.stop_audio();
    renderer.abort();
    println!("Bye.");
    Ok(())
}

fn spawn_renderer(mut events: UnboundedReceiver<ConversationEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut renderer = EventRenderer::new();
        while let Some(event) = events.recv().await {
            tracing::trace!(event = event.name(), "Rendering event");
            if let Some(line) = renderer.render(&event) {
                println!("{line}");
            }
        }
    })
}

async fn dispatch(orchestrator: &ConversationOrchestrator, command: ReplCommand) {
    match command {
        ReplCommand::Say(text) => {
            if let Err(e) = orchestrator.submit(&text).await {
                // Chat failures arrive as an Error event; only rejections need a line here.
                if e.is_rejection() {
                    eprintln!("{e}");
                }
            }
        }
        ReplCommand::Toggle(id) => {
            report_playback(id, orchestrator.toggle_audio(id).await);
        }
        ReplCommand::Play(id) => {
            report_playback(id, orchestrator.play_audio(id).await);
        }
        ReplCommand::Stop => orchestrator.stop_audio(),
        ReplCommand::History => {
            for message in orchestrator.messages() {
                println!("{}", format_message(&message));
            }
        }
        ReplCommand::Status => {
            println!("{}", format_session(&orchestrator.playback_session()));
            if orchestrator.is_submitting() {
                println!("waiting for a reply");
            }
            if let Some(error) = orchestrator.last_error() {
                println!("last chat error: {error}");
            }
        }
        ReplCommand::Help => println!("{HELP}"),
        ReplCommand::Quit | ReplCommand::Empty => {}
    }
}

fn report_playback(id: MessageId, result: Result<PlaybackOutcome, ConversationError>) {
    match result {
        Ok(PlaybackOutcome::Ignored) => println!("Audio for message {id} is still loading."),
        Ok(PlaybackOutcome::Superseded) => {
            tracing::debug!(message_id = %id, "Playback request superseded");
        }
        Ok(_) => {}
        // Playback failures are published on the session and rendered from there.
        Err(ConversationError::Playback(_)) => {}
        Err(e) => eprintln!("{e}"),
    }
}
