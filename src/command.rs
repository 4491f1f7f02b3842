//! Line commands of the terminal front end.

use std::path::PathBuf;

use crate::message::Message;
use crate::table::ArtifactFlag;

/// A parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Forward to the review app
    App(Message),
    /// List the image options
    ListImages,
    /// Re-render the current tile
    Show,
    /// Print progress
    Status,
    /// Write the corrected table, to the given path or the default one
    Export(Option<PathBuf>),
    Help,
    Quit,
}

/// Errors from parsing a command line.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command '{0}', try 'help'")]
    Unknown(String),

    #[error("'{command}' needs an argument: {usage}")]
    MissingArgument {
        command: &'static str,
        usage: &'static str,
    },

    #[error("Invalid number '{0}'")]
    InvalidNumber(String),
}

/// Usage text printed by `help`.
pub const HELP: &str = "\
commands:
  images            list images
  image <name>      select an image
  error <id>        select an error of the current image
  next | n          next flagged region
  prev | p          previous flagged region
  x <px>            move the horizontal slider
  y <px>            move the vertical slider
  artifact | a      label the current tile as artifact
  clean | c         label the current tile as no artifact
  toggle | t        flip the label of the current tile
  show              render the current tile again
  status            show progress
  export [path]     write the corrected table
  help              show this help
  quit | q          leave";

fn argument<'a>(
    arg: Option<&'a str>,
    command: &'static str,
    usage: &'static str,
) -> Result<&'a str, CommandError> {
    arg.ok_or(CommandError::MissingArgument { command, usage })
}

fn number<T: std::str::FromStr>(text: &str) -> Result<T, CommandError> {
    text.parse()
        .map_err(|_| CommandError::InvalidNumber(text.to_string()))
}

/// Parse one input line.
pub fn parse(line: &str) -> Result<Command, CommandError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err(CommandError::Empty);
    };
    let arg = words.next();

    let command = match head.to_ascii_lowercase().as_str() {
        "images" | "ls" => Command::ListImages,
        "image" | "i" => {
            let name = argument(arg, "image", "image <name>")?;
            Command::App(Message::SelectImage(name.to_string()))
        }
        "error" | "e" => {
            let id = argument(arg, "error", "error <id>")?;
            Command::App(Message::SelectError(number(id)?))
        }
        "next" | "n" => Command::App(Message::Next),
        "prev" | "p" => Command::App(Message::Prev),
        "x" => Command::App(Message::SetGridX(number(argument(arg, "x", "x <px>")?)?)),
        "y" => Command::App(Message::SetGridY(number(argument(arg, "y", "y <px>")?)?)),
        "artifact" | "a" => Command::App(Message::SetArtifact(ArtifactFlag::Artifact)),
        "clean" | "c" => Command::App(Message::SetArtifact(ArtifactFlag::NoArtifact)),
        "toggle" | "t" => Command::App(Message::ToggleArtifact),
        "show" => Command::Show,
        "status" | "s" => Command::Status,
        "export" => Command::Export(arg.map(PathBuf::from)),
        "help" | "h" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_app_messages() {
        assert_eq!(
            parse("image img_01").unwrap(),
            Command::App(Message::SelectImage("img_01".to_string()))
        );
        assert_eq!(
            parse("  error 3 ").unwrap(),
            Command::App(Message::SelectError(3))
        );
        assert_eq!(parse("x 400").unwrap(), Command::App(Message::SetGridX(400)));
        assert_eq!(parse("N").unwrap(), Command::App(Message::Next));
        assert_eq!(
            parse("clean").unwrap(),
            Command::App(Message::SetArtifact(ArtifactFlag::NoArtifact))
        );
        assert_eq!(parse("t").unwrap(), Command::App(Message::ToggleArtifact));
    }

    #[test]
    fn test_parse_front_end_commands() {
        assert_eq!(parse("export").unwrap(), Command::Export(None));
        assert_eq!(
            parse("export out/fixed.csv").unwrap(),
            Command::Export(Some(PathBuf::from("out/fixed.csv")))
        );
        assert_eq!(parse("status").unwrap(), Command::Status);
        assert_eq!(parse("q").unwrap(), Command::Quit);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse("   "), Err(CommandError::Empty));
        assert_eq!(
            parse("jump"),
            Err(CommandError::Unknown("jump".to_string()))
        );
        assert!(matches!(
            parse("image"),
            Err(CommandError::MissingArgument { command: "image", .. })
        ));
        assert_eq!(
            parse("x -5"),
            Err(CommandError::InvalidNumber("-5".to_string()))
        );
    }
}
