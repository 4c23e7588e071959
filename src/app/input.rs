//! Keyboard command parsing for the timer window.

use thiserror::Error;

use crate::types::{DurationField, Mode};

/// A command typed into the window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    /// Empty line: start when idle, otherwise pause or resume
    Toggle,
    Start,
    Pause,
    Resume,
    Restart,
    /// Switch to the given mode, or the other one
    Mode(Option<Mode>),
    OpenSettings,
    CloseSettings,
    /// Edit a duration field with raw input text
    SetDuration {
        mode: Mode,
        field: DurationField,
        raw: String,
    },
    Progress(bool),
    Help,
    Quit,
}

/// Errors raised while parsing a command line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("unknown command '{0}', type h for help")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("{0}")]
    InvalidArgument(String),
}

const SET_USAGE: &str = "set <focus|break> <minute|seconds> <value>";
const PROGRESS_USAGE: &str = "progress <on|off>";
const MODE_USAGE: &str = "mode [focus|break]";

impl UiCommand {
    /// Parses one input line.
    pub fn parse(line: &str) -> Result<Self, InputError> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(UiCommand::Toggle);
        };

        let command = match head.to_ascii_lowercase().as_str() {
            "s" | "start" => UiCommand::Start,
            "p" | "pause" => UiCommand::Pause,
            "r" | "resume" => UiCommand::Resume,
            "x" | "restart" => UiCommand::Restart,
            "o" | "settings" => UiCommand::OpenSettings,
            "c" | "close" => UiCommand::CloseSettings,
            "h" | "help" | "?" => UiCommand::Help,
            "q" | "quit" | "exit" => UiCommand::Quit,
            "m" | "mode" => {
                let target = words
                    .next()
                    .map(|w| w.parse::<Mode>().map_err(InputError::InvalidArgument))
                    .transpose()?;
                if words.next().is_some() {
                    return Err(InputError::Usage(MODE_USAGE));
                }
                UiCommand::Mode(target)
            }
            "set" => {
                let (Some(mode), Some(field)) = (words.next(), words.next()) else {
                    return Err(InputError::Usage(SET_USAGE));
                };
                let mode = mode.parse::<Mode>().map_err(InputError::InvalidArgument)?;
                let field = field
                    .parse::<DurationField>()
                    .map_err(InputError::InvalidArgument)?;
                // A missing value is a cleared field.
                let raw = words.next().unwrap_or_default().to_string();
                if words.next().is_some() {
                    return Err(InputError::Usage(SET_USAGE));
                }
                UiCommand::SetDuration { mode, field, raw }
            }
            "progress" => match words.next().map(str::to_ascii_lowercase).as_deref() {
                Some("on") => UiCommand::Progress(true),
                Some("off") => UiCommand::Progress(false),
                _ => return Err(InputError::Usage(PROGRESS_USAGE)),
            },
            other => return Err(InputError::Unknown(other.to_string())),
        };

        Ok(command)
    }
}
