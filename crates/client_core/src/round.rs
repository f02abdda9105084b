//! Per-round guess/feedback state machine.
//!
//! `Idle -> Active -> Ended`. A round ends on whichever comes first: the
//! server reporting a terminal result, the attempt budget running out, or
//! the countdown reaching zero. Once ended nothing but a new `begin` changes
//! the round; replies that arrive afterwards are discarded.

use shared::{
    domain::{GuessFeedback, GuessWord, LetterClass, RoundOutcome, RoundRules},
    protocol::{GuessEvaluation, RoundStatus},
};
use tracing::{debug, info, warn};

use crate::{
    error::{RoundError, ServiceError},
    overlay::KeyboardOverlay,
    timer::{Countdown, TimerSignal, TimerSignalKind},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    Idle,
    Active,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    Solved,
    AttemptsExhausted,
    ServerDeclared,
    TimeExpired,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoundSummary {
    pub round_id: u64,
    pub outcome: RoundOutcome,
    pub reason: EndReason,
    pub attempts: u32,
    pub score: Option<f64>,
    pub correct_word: Option<String>,
    pub time_taken_secs: Option<f64>,
}

/// Ticket for a guess that has been handed to the round service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingGuess {
    round_id: u64,
    word: GuessWord,
}

impl PendingGuess {
    pub fn round_id(&self) -> u64 {
        self.round_id
    }

    pub fn word(&self) -> &GuessWord {
        &self.word
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GuessApplied {
    Recorded {
        feedback: GuessFeedback,
        attempt: u32,
        keyboard: Vec<(char, LetterClass)>,
        ended: Option<RoundSummary>,
    },
    Rejected {
        message: String,
    },
    TransportFailed {
        error: ServiceError,
    },
    /// The reply belongs to a round that is no longer active.
    Discarded,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TimerUpdate {
    Tick { remaining_secs: u32 },
    Expired(RoundSummary),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoundSnapshot {
    pub round_id: u64,
    pub phase: RoundPhase,
    pub attempt_count: u32,
    pub max_attempts: u32,
    pub remaining_secs: u32,
    pub outcome: Option<RoundOutcome>,
    pub awaiting_reply: bool,
    pub history: Vec<GuessFeedback>,
    pub keyboard: KeyboardOverlay,
    pub summary: Option<RoundSummary>,
}

pub struct RoundStateMachine<T: Countdown> {
    countdown: T,
    rules: RoundRules,
    phase: RoundPhase,
    round_id: u64,
    history: Vec<GuessFeedback>,
    outcome: Option<RoundOutcome>,
    remaining_secs: u32,
    awaiting_reply: bool,
    overlay: KeyboardOverlay,
    summary: Option<RoundSummary>,
}

impl<T: Countdown> RoundStateMachine<T> {
    pub fn new(countdown: T) -> Self {
        let rules = RoundRules::default();
        Self {
            countdown,
            rules,
            phase: RoundPhase::Idle,
            round_id: 0,
            history: Vec::new(),
            outcome: None,
            remaining_secs: deadline_secs(&rules),
            awaiting_reply: false,
            overlay: KeyboardOverlay::new(),
            summary: None,
        }
    }

    /// Starts a fresh round once the round service has confirmed it.
    pub fn begin(&mut self, rules: RoundRules) -> u64 {
        self.round_id += 1;
        self.rules = rules;
        self.phase = RoundPhase::Active;
        self.history.clear();
        self.outcome = None;
        self.summary = None;
        self.awaiting_reply = false;
        self.overlay.reset();
        self.remaining_secs = deadline_secs(&rules);
        self.countdown.start(rules.deadline);
        info!(
            round_id = self.round_id,
            max_attempts = rules.max_attempts,
            deadline_secs = self.remaining_secs,
            "round: started"
        );
        self.round_id
    }

    pub fn prepare_submit(&mut self, input: &str) -> Result<PendingGuess, RoundError> {
        if self.phase != RoundPhase::Active {
            return Err(RoundError::NotActive);
        }
        if self.awaiting_reply {
            return Err(RoundError::RequestInFlight);
        }
        let word = GuessWord::parse(input)?;
        self.awaiting_reply = true;
        debug!(round_id = self.round_id, guess = %word, "round: guess submitted");
        Ok(PendingGuess {
            round_id: self.round_id,
            word,
        })
    }

    pub fn apply_guess(
        &mut self,
        pending: PendingGuess,
        reply: Result<GuessEvaluation, ServiceError>,
    ) -> GuessApplied {
        if pending.round_id != self.round_id || self.phase != RoundPhase::Active {
            info!(
                reply_round_id = pending.round_id,
                round_id = self.round_id,
                phase = ?self.phase,
                "round: discarding guess reply for inactive round"
            );
            return GuessApplied::Discarded;
        }
        self.awaiting_reply = false;

        let evaluation = match reply {
            Ok(evaluation) => evaluation,
            Err(ServiceError::Rejected { message, .. }) => {
                info!(round_id = self.round_id, %message, "round: guess rejected");
                return GuessApplied::Rejected { message };
            }
            Err(error) => {
                warn!(round_id = self.round_id, %error, "round: guess request failed");
                return GuessApplied::TransportFailed { error };
            }
        };

        let feedback = match GuessFeedback::new(pending.word, &evaluation.feedback) {
            Ok(feedback) => feedback,
            Err(err) => {
                warn!(round_id = self.round_id, %err, "round: malformed guess feedback");
                return GuessApplied::TransportFailed {
                    error: ServiceError::MalformedResponse(err.to_string()),
                };
            }
        };

        let keyboard = self.overlay.merge(&feedback);
        self.history.push(feedback.clone());
        let attempt = self.attempt_count();
        info!(
            round_id = self.round_id,
            attempt,
            game_over = evaluation.game_over,
            "round: guess recorded"
        );

        let declared = evaluation
            .game_over
            .then(|| {
                evaluation
                    .result
                    .and_then(RoundStatus::outcome)
                    .unwrap_or(RoundOutcome::Loss)
            });
        let exhausted = attempt >= self.rules.max_attempts;
        let ended = match (declared, exhausted) {
            (Some(RoundOutcome::Win), _) => Some((RoundOutcome::Win, EndReason::Solved)),
            (Some(RoundOutcome::Loss), true) | (None, true) => {
                Some((RoundOutcome::Loss, EndReason::AttemptsExhausted))
            }
            (Some(RoundOutcome::Loss), false) => {
                Some((RoundOutcome::Loss, EndReason::ServerDeclared))
            }
            (None, false) => None,
        };

        let ended = ended.map(|(outcome, reason)| {
            self.finish(RoundSummary {
                round_id: self.round_id,
                outcome,
                reason,
                attempts: attempt,
                score: evaluation.score,
                correct_word: evaluation.correct_word.clone(),
                time_taken_secs: evaluation.time_taken,
            })
        });

        GuessApplied::Recorded {
            feedback,
            attempt,
            keyboard,
            ended,
        }
    }

    pub fn handle_timer(&mut self, signal: TimerSignal) -> Option<TimerUpdate> {
        if signal.epoch != self.countdown.epoch() {
            debug!(
                signal_epoch = signal.epoch,
                epoch = self.countdown.epoch(),
                "round: ignoring stale timer signal"
            );
            return None;
        }
        if self.phase != RoundPhase::Active {
            return None;
        }

        match signal.kind {
            TimerSignalKind::Tick { remaining_secs } => {
                self.remaining_secs = remaining_secs;
                if remaining_secs == 0 {
                    return Some(TimerUpdate::Expired(self.expire()));
                }
                Some(TimerUpdate::Tick { remaining_secs })
            }
            TimerSignalKind::Expired => Some(TimerUpdate::Expired(self.expire())),
        }
    }

    /// Drops the current round without an outcome; used when the session ends.
    pub fn abandon(&mut self) {
        self.countdown.stop();
        if self.phase != RoundPhase::Idle {
            info!(round_id = self.round_id, phase = ?self.phase, "round: abandoned");
        }
        self.phase = RoundPhase::Idle;
        self.awaiting_reply = false;
        self.history.clear();
        self.outcome = None;
        self.summary = None;
        self.overlay.reset();
        self.remaining_secs = deadline_secs(&self.rules);
    }

    fn expire(&mut self) -> RoundSummary {
        self.remaining_secs = 0;
        let deadline = self.rules.deadline.as_secs_f64();
        info!(
            round_id = self.round_id,
            attempts = self.attempt_count(),
            awaiting_reply = self.awaiting_reply,
            "round: deadline reached"
        );
        self.finish(RoundSummary {
            round_id: self.round_id,
            outcome: RoundOutcome::Loss,
            reason: EndReason::TimeExpired,
            attempts: self.attempt_count(),
            score: Some(0.0),
            correct_word: None,
            time_taken_secs: Some(deadline),
        })
    }

    fn finish(&mut self, summary: RoundSummary) -> RoundSummary {
        self.countdown.stop();
        self.phase = RoundPhase::Ended;
        self.outcome = Some(summary.outcome);
        self.awaiting_reply = false;
        self.summary = Some(summary.clone());
        info!(
            round_id = self.round_id,
            outcome = ?summary.outcome,
            reason = ?summary.reason,
            attempts = summary.attempts,
            "round: ended"
        );
        summary
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn round_id(&self) -> u64 {
        self.round_id
    }

    pub fn rules(&self) -> RoundRules {
        self.rules
    }

    pub fn attempt_count(&self) -> u32 {
        self.history.len() as u32
    }

    pub fn outcome(&self) -> Option<RoundOutcome> {
        self.outcome
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn is_active(&self) -> bool {
        self.phase == RoundPhase::Active
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    pub fn history(&self) -> &[GuessFeedback] {
        &self.history
    }

    pub fn overlay(&self) -> &KeyboardOverlay {
        &self.overlay
    }

    pub fn summary(&self) -> Option<&RoundSummary> {
        self.summary.as_ref()
    }

    pub fn countdown(&self) -> &T {
        &self.countdown
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        RoundSnapshot {
            round_id: self.round_id,
            phase: self.phase,
            attempt_count: self.attempt_count(),
            max_attempts: self.rules.max_attempts,
            remaining_secs: self.remaining_secs,
            outcome: self.outcome,
            awaiting_reply: self.awaiting_reply,
            history: self.history.clone(),
            keyboard: self.overlay.clone(),
            summary: self.summary.clone(),
        }
    }
}

fn deadline_secs(rules: &RoundRules) -> u32 {
    u32::try_from(rules.deadline.as_secs()).unwrap_or(u32::MAX)
}

#[cfg(test)]
#[path = "tests/round_tests.rs"]
mod tests;
