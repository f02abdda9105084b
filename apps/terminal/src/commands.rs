//! Line commands typed at the prompt.

use shared::domain::WORD_LENGTH;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login {
        username: String,
        password: String,
    },
    Register {
        username: String,
        password: String,
        display_name: Option<String>,
        email: Option<String>,
    },
    Start,
    Guess(String),
    Board,
    Leaderboard,
    Rules,
    Profile,
    ProfileSet {
        display_name: String,
        email: Option<String>,
    },
    Logout,
    Help,
    Quit,
}

impl Command {
    /// Name used in logs; never includes arguments such as passwords.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Login { .. } => "login",
            Self::Register { .. } => "register",
            Self::Start => "start",
            Self::Guess(_) => "guess",
            Self::Board => "board",
            Self::Leaderboard => "leaderboard",
            Self::Rules => "rules",
            Self::Profile => "profile",
            Self::ProfileSet { .. } => "profile_set",
            Self::Logout => "logout",
            Self::Help => "help",
            Self::Quit => "quit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty input")]
    Empty,
    #[error("unknown command `{0}`, type `help` for the list")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

pub const HELP: &str = "\
commands:
  login <username> <password>
  register <username> <password> [display_name] [email]
  start                      start a new round
  guess <word>               submit a guess (a bare 5-letter word works too)
  board                      show the grid, keyboard and clock
  leaderboard                show the top scores
  rules                      show the rules
  profile                    show your profile and stats
  profile set <display_name> [email]
  logout
  help
  quit";

pub fn parse(line: &str) -> Result<Command, CommandError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err(CommandError::Empty);
    };
    let args: Vec<&str> = words.collect();

    let command = match head.to_ascii_lowercase().as_str() {
        "login" => match args.as_slice() {
            [username, password] => Command::Login {
                username: username.to_string(),
                password: password.to_string(),
            },
            _ => return Err(CommandError::Usage("login <username> <password>")),
        },
        "register" => match args.as_slice() {
            [username, password, rest @ ..] if rest.len() <= 2 => Command::Register {
                username: username.to_string(),
                password: password.to_string(),
                display_name: rest.first().map(|name| name.to_string()),
                email: rest.get(1).map(|email| email.to_string()),
            },
            _ => {
                return Err(CommandError::Usage(
                    "register <username> <password> [display_name] [email]",
                ))
            }
        },
        "start" | "new" => Command::Start,
        "guess" => match args.as_slice() {
            [word] => Command::Guess(word.to_string()),
            _ => return Err(CommandError::Usage("guess <word>")),
        },
        "board" => Command::Board,
        "leaderboard" | "lb" => Command::Leaderboard,
        "rules" => Command::Rules,
        "profile" => match args.as_slice() {
            [] => Command::Profile,
            ["set", display_name] => Command::ProfileSet {
                display_name: display_name.to_string(),
                email: None,
            },
            ["set", display_name, email] => Command::ProfileSet {
                display_name: display_name.to_string(),
                email: Some(email.to_string()),
            },
            _ => return Err(CommandError::Usage("profile set <display_name> [email]")),
        },
        "logout" => Command::Logout,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ if args.is_empty() && looks_like_guess(head) => Command::Guess(head.to_string()),
        _ => return Err(CommandError::Unknown(head.to_string())),
    };
    Ok(command)
}

fn looks_like_guess(word: &str) -> bool {
    word.chars().count() == WORD_LENGTH && word.chars().all(|c| c.is_ascii_alphabetic())
}

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;
