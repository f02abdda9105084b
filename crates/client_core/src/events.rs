//! Events published by [`crate::GameSession`] for presentation layers.

use shared::{
    domain::{GuessFeedback, LetterClass, View},
    protocol::LeaderboardEntry,
};

use crate::{error::ErrorCategory, round::RoundSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error(ErrorCategory),
}

/// Transient message for the user, the equivalent of a toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error(category),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    ViewChanged(View),
    IdentityLabel(String),
    RoundStarted {
        round_id: u64,
        max_attempts: u32,
        deadline_secs: u32,
    },
    GuessRecorded {
        round_id: u64,
        attempt: u32,
        feedback: GuessFeedback,
        keyboard: Vec<(char, LetterClass)>,
    },
    TimerTick {
        remaining_secs: u32,
    },
    RoundEnded(RoundSummary),
    /// Input must stay disabled while a guess is outstanding.
    InputLocked(bool),
    LeaderboardLoaded(Vec<LeaderboardEntry>),
    Notice(Notice),
}
