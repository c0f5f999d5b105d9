//! Input line parsing

use std::path::PathBuf;
use thiserror::Error;

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Plain text; sent together with any staged images
    Send(String),
    Attach(Vec<PathBuf>),
    /// Remove a staged image by its 1-based position
    Remove(usize),
    Staged,
    /// Start dictation, replaying audio from a file
    Record(PathBuf),
    Stop,
    Diagnose(String),
    Clear,
    Save,
    Sessions,
    Login {
        email: String,
        password: String,
    },
    Register {
        email: String,
        password: String,
        name: String,
    },
    Logout,
    Help,
    Quit,
    Empty,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown command /{0}, type /help for a list")]
    Unknown(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
}

pub const HELP: &str = "\
Type a message and press enter to send it with any attached images.

  /attach <file>...             attach crop images (up to 5)
  /staged                       list attached images
  /remove <n>                   remove the n-th attached image
  /diagnose [text]              run image diagnosis on the attached images
  /record <audio-file>          start dictation from an audio file
  /stop                         stop dictation and add the transcript
  /clear                        start a new chat
  /save                         save this chat to your account
  /sessions                     list saved chats
  /register <email> <password> <name>
  /login <email> <password>
  /logout
  /help
  /quit";

pub fn parse(line: &str) -> Result<Input, ParseError> {
    let line = line.trim();
    let Some(command) = line.strip_prefix('/') else {
        return Ok(if line.is_empty() {
            Input::Empty
        } else {
            Input::Send(line.to_string())
        });
    };

    let (name, rest) = match command.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (command, ""),
    };
    let args: Vec<&str> = rest.split_whitespace().collect();

    match name {
        "attach" | "a" => {
            if args.is_empty() {
                return Err(ParseError::Usage("/attach <file>..."));
            }
            Ok(Input::Attach(args.into_iter().map(PathBuf::from).collect()))
        }
        "staged" => Ok(Input::Staged),
        "remove" | "rm" => match args.as_slice() {
            [n] => n
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .map(Input::Remove)
                .ok_or(ParseError::Usage("/remove <n>")),
            _ => Err(ParseError::Usage("/remove <n>")),
        },
        "diagnose" | "d" => Ok(Input::Diagnose(rest.to_string())),
        "record" | "r" => {
            if rest.is_empty() {
                return Err(ParseError::Usage("/record <audio-file>"));
            }
            Ok(Input::Record(PathBuf::from(rest)))
        }
        "stop" => Ok(Input::Stop),
        "clear" => Ok(Input::Clear),
        "save" => Ok(Input::Save),
        "sessions" => Ok(Input::Sessions),
        "login" => match args.as_slice() {
            [email, password] => Ok(Input::Login {
                email: (*email).to_string(),
                password: (*password).to_string(),
            }),
            _ => Err(ParseError::Usage("/login <email> <password>")),
        },
        "register" => match args.as_slice() {
            [email, password, name @ ..] if !name.is_empty() => Ok(Input::Register {
                email: (*email).to_string(),
                password: (*password).to_string(),
                name: name.join(" "),
            }),
            _ => Err(ParseError::Usage("/register <email> <password> <name>")),
        },
        "logout" => Ok(Input::Logout),
        "help" | "h" | "?" => Ok(Input::Help),
        "quit" | "exit" | "q" => Ok(Input::Quit),
        other => Err(ParseError::Unknown(other.to_string())),
    }
}
