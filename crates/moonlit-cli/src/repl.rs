//! Parsing of chat prompt lines into intents.

use moonlit_core::MessageId;
use thiserror::Error;

/// Help text for the chat prompt.
pub const HELP: &str = "\
Type a message and press Enter to send it.

  /toggle <id>   pause or resume the audio of a message
  /play <id>     speak a message from the start
  /stop          stop playback
  /history       show the conversation
  /status        show playback and submission state
  /help          show this help
  /quit          leave (also Ctrl-D)";

/// One line of input, interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Send text to the backend.
    Say(String),
    Toggle(MessageId),
    Play(MessageId),
    Stop,
    History,
    Status,
    Help,
    Quit,
    /// Blank line.
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplError {
    #[error("Unknown command /{0}. Type /help for the list.")]
    UnknownCommand(String),

    #[error("/{0} needs a message id, e.g. /{0} 2")]
    MissingId(&'static str),

    #[error("'{0}' is not a message id")]
    InvalidId(String),
}

/// Interpret one input line.
pub fn parse(line: &str) -> Result<ReplCommand, ReplError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ReplCommand::Empty);
    }

    let Some(rest) = line.strip_prefix('/') else {
        return Ok(ReplCommand::Say(line.to_string()));
    };

    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next();

    match name {
        "toggle" | "t" => message_id("toggle", arg).map(ReplCommand::Toggle),
        "play" | "p" => message_id("play", arg).map(ReplCommand::Play),
        "stop" | "s" => Ok(ReplCommand::Stop),
        "history" => Ok(ReplCommand::History),
        "status" => Ok(ReplCommand::Status),
        "help" | "?" => Ok(ReplCommand::Help),
        "quit" | "exit" | "q" => Ok(ReplCommand::Quit),
        other => Err(ReplError::UnknownCommand(other.to_string())),
    }
}

fn message_id(command: &'static str, arg: Option<&str>) -> Result<MessageId, ReplError> {
    let raw = arg.ok_or(ReplError::MissingId(command))?;
    raw.trim_start_matches('#')
        .parse::<u64>()
        .map(MessageId::new)
        .map_err(|_| ReplError::InvalidId(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_sent_trimmed() {
        assert_eq!(
            parse("  hello there  ").unwrap(),
            ReplCommand::Say("hello there".to_string())
        );
    }

    #[test]
    fn blank_line_is_empty() {
        assert_eq!(parse("   ").unwrap(), ReplCommand::Empty);
    }

    #[test]
    fn playback_commands_take_ids() {
        assert_eq!(
            parse("/toggle 4").unwrap(),
            ReplCommand::Toggle(MessageId::new(4))
        );
        assert_eq!(
            parse("/p #2").unwrap(),
            ReplCommand::Play(MessageId::new(2))
        );
        assert_eq!(parse("/stop").unwrap(), ReplCommand::Stop);
    }

    #[test]
    fn missing_and_bad_ids_are_errors() {
        assert_eq!(parse("/toggle"), Err(ReplError::MissingId("toggle")));
        assert_eq!(
            parse("/play two"),
            Err(ReplError::InvalidId("two".to_string()))
        );
    }

    #[test]
    fn view_commands_and_aliases() {
        assert_eq!(parse("/history").unwrap(), ReplCommand::History);
        assert_eq!(parse("/status").unwrap(), ReplCommand::Status);
        assert_eq!(parse("/?").unwrap(), ReplCommand::Help);
        assert_eq!(parse("/exit").unwrap(), ReplCommand::Quit);
    }

    #[test]
    fn unknown_command_is_reported() {
        let err = parse("/dance now").unwrap_err();
        assert_eq!(err, ReplError::UnknownCommand("dance".to_string()));
        assert!(err.to_string().contains("/help"));
    }
}
