use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const WORD_LENGTH: usize = 5;
pub const MAX_ATTEMPTS: u32 = 6;
pub const ROUND_DEADLINE: Duration = Duration::from_secs(240);

/// Per-letter evaluation of a guess.
///
/// Variants are declared weakest first so the derived ordering is the
/// keyboard precedence: `Gray < Yellow < Green`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LetterClass {
    Gray,
    Yellow,
    Green,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundOutcome {
    Win,
    Loss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Auth,
    Rules,
    Game,
    Leaderboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuessValidationError {
    #[error("guess must be exactly {expected} letters, got {actual}")]
    WrongLength { expected: usize, actual: usize },
    #[error("guess may only contain letters, found {0:?}")]
    NonLetter(char),
}

/// A syntactically valid guess: exactly [`WORD_LENGTH`] uppercase ASCII letters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GuessWord(String);

impl GuessWord {
    pub fn parse(input: &str) -> Result<Self, GuessValidationError> {
        let trimmed = input.trim();
        if let Some(bad) = trimmed.chars().find(|c| !c.is_ascii_alphabetic()) {
            return Err(GuessValidationError::NonLetter(bad));
        }
        let actual = trimmed.chars().count();
        if actual != WORD_LENGTH {
            return Err(GuessValidationError::WrongLength {
                expected: WORD_LENGTH,
                actual,
            });
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn letters(&self) -> impl Iterator<Item = char> + '_ {
        self.0.chars()
    }
}

impl fmt::Display for GuessWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for GuessWord {
    type Error = GuessValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<GuessWord> for String {
    fn from(value: GuessWord) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("feedback must classify {expected} letters, got {actual}")]
pub struct FeedbackShapeError {
    pub expected: usize,
    pub actual: usize,
}

/// Evaluation of one submitted guess, positionally aligned with the word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessFeedback {
    pub word: GuessWord,
    pub letters: [LetterClass; WORD_LENGTH],
}

impl GuessFeedback {
    pub fn new(word: GuessWord, classes: &[LetterClass]) -> Result<Self, FeedbackShapeError> {
        let letters: [LetterClass; WORD_LENGTH] =
            classes.try_into().map_err(|_| FeedbackShapeError {
                expected: WORD_LENGTH,
                actual: classes.len(),
            })?;
        Ok(Self { word, letters })
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, LetterClass)> + '_ {
        self.word.letters().zip(self.letters.iter().copied())
    }
}

/// Limits of a single round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundRules {
    pub max_attempts: u32,
    pub deadline: Duration,
}

impl Default for RoundRules {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            deadline: ROUND_DEADLINE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_since: Option<String>,
}

impl Identity {
    /// Name shown in navigation: display name, falling back to the username.
    pub fn label(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.username,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guess_word_uppercases_and_trims() {
        let word = GuessWord::parse("  crane\n").expect("valid");
        assert_eq!(word.as_str(), "CRANE");
    }

    #[test]
    fn guess_word_rejects_wrong_length_and_symbols() {
        assert_eq!(
            GuessWord::parse("TOOLONG"),
            Err(GuessValidationError::WrongLength {
                expected: 5,
                actual: 7
            })
        );
        assert_eq!(
            GuessWord::parse("CR4NE"),
            Err(GuessValidationError::NonLetter('4'))
        );
        assert_eq!(
            GuessWord::parse("CRÄNE"),
            Err(GuessValidationError::NonLetter('Ä'))
        );
    }

    #[test]
    fn letter_class_order_is_keyboard_precedence() {
        assert!(LetterClass::Green > LetterClass::Yellow);
        assert!(LetterClass::Yellow > LetterClass::Gray);
    }

    #[test]
    fn feedback_requires_one_class_per_letter() {
        let word = GuessWord::parse("CRANE").expect("valid");
        let err = GuessFeedback::new(word, &[LetterClass::Gray; 4]).expect_err("short");
        assert_eq!(err.actual, 4);
    }

    #[test]
    fn identity_label_falls_back_to_username() {
        let mut identity = Identity {
            username: "alice".into(),
            ..Identity::default()
        };
        assert_eq!(identity.label(), "alice");
        identity.display_name = Some("Alice A.".into());
        assert_eq!(identity.label(), "Alice A.");
    }
}
