//! Slash commands understood by the chat prompt.

use smartie_core::{FontSize, Theme, UnknownPreference, WindowSize};
use thiserror::Error;

pub const HELP: &str = "\
Type a question and press Enter. Commands:
  /name <name>        change your display name
  /avatar <ref>       change your avatar
  /theme <id>         default, dark, blue, green, purple, orange
  /font <id>          small, medium, large, extra-large
  /window <id>        compact, regular, expanded
  /history            print the transcript
  /speak <n>          read answer n aloud
  /stop               stop speaking
  /listen             ask by voice
  /clear              delete the transcript
  /help               show this help
  /quit               leave";

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Ask(String),
    Rename(String),
    Avatar(String),
    Theme(Theme),
    Font(FontSize),
    Window(WindowSize),
    History,
    Speak(usize),
    Stop,
    Listen,
    Clear,
    Help,
    Quit,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unknown command '/{0}', try /help")]
    UnknownCommand(String),

    #[error("/{0} needs an argument")]
    MissingArgument(&'static str),

    #[error("'{0}' is not a message number")]
    BadIndex(String),

    #[error(transparent)]
    Preference(#[from] UnknownPreference),
}

impl ReplCommand {
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let line = line.trim();
        let Some(command) = line.strip_prefix('/') else {
            return Ok(if line.is_empty() {
                Self::Empty
            } else {
                Self::Ask(line.to_string())
            });
        };

        let (name, arg) = command
            .split_once(char::is_whitespace)
            .map_or((command, ""), |(n, a)| (n, a.trim()));

        let required = |name: &'static str| {
            if arg.is_empty() {
                Err(ParseError::MissingArgument(name))
            } else {
                Ok(arg)
            }
        };

        Ok(match name {
            "name" => Self::Rename(required("name")?.to_string()),
            "avatar" => Self::Avatar(required("avatar")?.to_string()),
            "theme" => Self::Theme(required("theme")?.parse()?),
            "font" => Self::Font(required("font")?.parse()?),
            "window" => Self::Window(required("window")?.parse()?),
            "history" => Self::History,
            "speak" => {
                let raw = required("speak")?;
                let index = raw
                    .parse()
                    .map_err(|_| ParseError::BadIndex(raw.to_string()))?;
                Self::Speak(index)
            }
            "stop" => Self::Stop,
            "listen" => Self::Listen,
            "clear" => Self::Clear,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(ParseError::UnknownCommand(other.to_string())),
        })
    }
}
