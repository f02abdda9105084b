//! Plain-text rendering of session state and events.
//!
//! Tiles: `[A]` green, `(A)` yellow, ` a ` gray, ` A ` not yet played.

use client_core::{
    EndReason, GameEvent, KeyboardOverlay, Notice, NoticeKind, ProfileSnapshot, RoundPhase,
    RoundSnapshot, RoundSummary,
};
use shared::{
    domain::{GuessFeedback, LetterClass, RoundOutcome, View, WORD_LENGTH},
    protocol::LeaderboardEntry,
};

pub const URGENT_SECS: u32 = 30;

pub const RULES: &str = "\
Guess the hidden five-letter word.
  [A]  right letter, right spot
  (A)  in the word, wrong spot
   a   not in the word
You have 6 attempts and 4 minutes. Fewer attempts and a faster solve score higher.
Type `start` to begin.";

pub fn format_clock(remaining_secs: u32) -> String {
    format!("{:02}:{:02}", remaining_secs / 60, remaining_secs % 60)
}

pub fn is_urgent(remaining_secs: u32) -> bool {
    remaining_secs <= URGENT_SECS
}

pub fn clock(remaining_secs: u32) -> String {
    let display = format_clock(remaining_secs);
    if is_urgent(remaining_secs) {
        format!("{display} (hurry!)")
    } else {
        display
    }
}

/// Leaderboard time column.
pub fn format_time_taken(secs: u64) -> String {
    format!("{}m {}s", secs / 60, secs % 60)
}

pub fn rank_label(index: usize) -> String {
    match index {
        0 => "🥇".into(),
        1 => "🥈".into(),
        2 => "🥉".into(),
        n => format!("#{}", n + 1),
    }
}

fn tile(letter: char, class: Option<LetterClass>) -> String {
    match class {
        Some(LetterClass::Green) => format!("[{letter}]"),
        Some(LetterClass::Yellow) => format!("({letter})"),
        Some(LetterClass::Gray) => format!(" {} ", letter.to_ascii_lowercase()),
        None => format!(" {letter} "),
    }
}

pub fn guess_row(feedback: &GuessFeedback) -> String {
    feedback
        .iter()
        .map(|(letter, class)| tile(letter, Some(class)))
        .collect()
}

fn empty_row() -> String {
    " _ ".repeat(WORD_LENGTH)
}

pub fn grid(history: &[GuessFeedback], max_attempts: u32) -> Vec<String> {
    let mut rows: Vec<String> = history.iter().map(guess_row).collect();
    let unused = (max_attempts as usize).saturating_sub(rows.len());
    rows.extend(std::iter::repeat_with(empty_row).take(unused));
    rows
}

pub fn keyboard(overlay: &KeyboardOverlay) -> Vec<String> {
    overlay
        .rows()
        .into_iter()
        .enumerate()
        .map(|(indent, keys)| {
            let keys: String = keys
                .into_iter()
                .map(|(letter, class)| tile(letter, class))
                .collect();
            format!("{}{keys}", " ".repeat(indent))
        })
        .collect()
}

pub fn board(snapshot: &RoundSnapshot) -> String {
    if snapshot.phase == RoundPhase::Idle {
        return "No round in progress. Type `start` to play.".into();
    }
    let mut lines = vec![format!(
        "round {}  attempts {}/{}  time {}",
        snapshot.round_id,
        snapshot.attempt_count,
        snapshot.max_attempts,
        clock(snapshot.remaining_secs)
    )];
    lines.extend(grid(&snapshot.history, snapshot.max_attempts));
    lines.push(String::new());
    lines.extend(keyboard(&snapshot.keyboard));
    if let Some(summary) = &snapshot.summary {
        lines.push(String::new());
        lines.push(round_result(summary));
    } else if snapshot.awaiting_reply {
        lines.push("checking guess...".into());
    }
    lines.join("\n")
}

pub fn round_result(summary: &RoundSummary) -> String {
    let word = summary.correct_word.as_deref().unwrap_or("—");
    match summary.outcome {
        RoundOutcome::Win => {
            let plural = if summary.attempts == 1 { "" } else { "s" };
            let score = summary
                .score
                .map(|score| format!("  score {score}"))
                .unwrap_or_default();
            format!(
                "Victory! The word was {word}. Cracked in {} attempt{plural}.{score}",
                summary.attempts
            )
        }
        RoundOutcome::Loss => {
            let reason = match summary.reason {
                EndReason::TimeExpired => "Time's up.",
                EndReason::AttemptsExhausted => "Out of attempts.",
                EndReason::ServerDeclared | EndReason::Solved => "Round over.",
            };
            format!("Game over. {reason} The word was {word}. Type `start` to try again.")
        }
    }
}

pub fn leaderboard(entries: &[LeaderboardEntry]) -> String {
    if entries.is_empty() {
        return "No scores yet. Be the first champion!".into();
    }
    let mut lines = vec![format!(
        "{:<5} {:<20} {:>8} {:>8} {:>8}",
        "rank", "player", "score", "tries", "time"
    )];
    for (index, entry) in entries.iter().enumerate() {
        let time = entry
            .time_taken
            .filter(|secs| *secs > 0)
            .map_or_else(|| "—".to_owned(), format_time_taken);
        lines.push(format!(
            "{:<5} {:<20} {:>8} {:>8} {:>8}",
            rank_label(index),
            entry.label(),
            entry.score,
            format!("{}/6", entry.attempts),
            time
        ));
    }
    lines.join("\n")
}

pub fn profile(snapshot: &ProfileSnapshot) -> String {
    let identity = &snapshot.identity;
    let mut lines = vec![
        format!("username      {}", identity.username),
        format!("display name  {}", identity.display_name.as_deref().unwrap_or("")),
        format!("email         {}", identity.email.as_deref().unwrap_or("")),
    ];
    if let Some(since) = &identity.member_since {
        lines.push(format!("member since  {since}"));
    }
    match &snapshot.stats {
        Some(stats) => {
            lines.push(format!(
                "games {}  wins {}  losses {}  win rate {}%  best {}",
                stats.total_games, stats.wins, stats.losses, stats.win_rate, stats.best_score
            ));
        }
        None => lines.push("stats unavailable".into()),
    }
    lines.join("\n")
}

pub fn notice(notice: &Notice) -> String {
    let tag = match notice.kind {
        NoticeKind::Info => "[i]",
        NoticeKind::Success => "[ok]",
        NoticeKind::Error(_) => "[!]",
    };
    format!("{tag} {}", notice.message)
}

/// Countdown lines are throttled to the minute marks and the final stretch.
pub fn tick_line(remaining_secs: u32) -> Option<String> {
    let announce = remaining_secs > 0
        && (remaining_secs % 60 == 0 || remaining_secs == URGENT_SECS || remaining_secs <= 10);
    announce.then(|| format!("time left {}", clock(remaining_secs)))
}

fn view_line(view: View) -> String {
    match view {
        View::Auth => "== sign in ==  `login <user> <password>` or `register ...`".into(),
        View::Rules => format!("== rules ==\n{RULES}"),
        View::Game => "== game ==  type a five-letter word".into(),
        View::Leaderboard => "== leaderboard ==".into(),
    }
}

pub fn event_line(event: &GameEvent) -> Option<String> {
    match event {
        GameEvent::ViewChanged(view) => Some(view_line(*view)),
        GameEvent::IdentityLabel(label) => Some(format!("player: {label}")),
        GameEvent::RoundStarted {
            round_id,
            max_attempts,
            deadline_secs,
        } => Some(format!(
            "round {round_id} started: {max_attempts} attempts, {} on the clock",
            format_clock(*deadline_secs)
        )),
        GameEvent::GuessRecorded {
            attempt, feedback, ..
        } => Some(format!("{attempt}. {}", guess_row(feedback))),
        GameEvent::TimerTick { remaining_secs } => tick_line(*remaining_secs),
        GameEvent::RoundEnded(summary) => Some(round_result(summary)),
        GameEvent::InputLocked(true) => Some("checking guess...".into()),
        GameEvent::InputLocked(false) => None,
        GameEvent::LeaderboardLoaded(entries) => Some(leaderboard(entries)),
        GameEvent::Notice(n) => Some(notice(n)),
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
