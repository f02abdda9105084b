use std::time::Duration;

use super::*;
use shared::error::ErrorCode;
use LetterClass::{Gray, Green, Yellow};

#[derive(Default)]
struct ManualCountdown {
    epoch: u64,
    running: bool,
    starts: u32,
    last_deadline: Option<Duration>,
}

impl Countdown for ManualCountdown {
    fn start(&mut self, deadline: Duration) {
        self.stop();
        self.running = true;
        self.starts += 1;
        self.last_deadline = Some(deadline);
    }

    fn stop(&mut self) {
        self.running = false;
        self.epoch += 1;
    }

    fn epoch(&self) -> u64 {
        self.epoch
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

fn machine() -> RoundStateMachine<ManualCountdown> {
    let mut round = RoundStateMachine::new(ManualCountdown::default());
    round.begin(RoundRules::default());
    round
}

fn evaluation(classes: [LetterClass; 5]) -> GuessEvaluation {
    GuessEvaluation {
        feedback: classes.to_vec(),
        game_over: false,
        result: Some(RoundStatus::Playing),
        score: Some(0.0),
        correct_word: None,
        attempts: None,
        time_taken: None,
    }
}

fn tick(round: &RoundStateMachine<ManualCountdown>, remaining_secs: u32) -> TimerSignal {
    TimerSignal {
        epoch: round.countdown().epoch(),
        kind: TimerSignalKind::Tick { remaining_secs },
    }
}

fn expired(round: &RoundStateMachine<ManualCountdown>) -> TimerSignal {
    TimerSignal {
        epoch: round.countdown().epoch(),
        kind: TimerSignalKind::Expired,
    }
}

fn guess(
    round: &mut RoundStateMachine<ManualCountdown>,
    word: &str,
    reply: GuessEvaluation,
) -> GuessApplied {
    let pending = round.prepare_submit(word).expect("submit accepted");
    round.apply_guess(pending, Ok(reply))
}

#[test]
fn begin_activates_and_starts_countdown() {
    let round = machine();
    assert_eq!(round.phase(), RoundPhase::Active);
    assert_eq!(round.attempt_count(), 0);
    assert_eq!(round.outcome(), None);
    assert_eq!(round.remaining_secs(), 240);
    assert!(round.countdown().is_running());
    assert_eq!(
        round.countdown().last_deadline,
        Some(Duration::from_secs(240))
    );
}

#[test]
fn submit_requires_active_round() {
    let mut round = RoundStateMachine::new(ManualCountdown::default());
    assert_eq!(round.prepare_submit("CRANE"), Err(RoundError::NotActive));
}

#[test]
fn malformed_guess_is_rejected_locally_without_state_change() {
    let mut round = machine();
    let err = round.prepare_submit("CRAN").expect_err("too short");
    assert!(matches!(err, RoundError::InvalidGuess(_)));
    let err = round.prepare_submit("CR-NE").expect_err("symbol");
    assert!(matches!(err, RoundError::InvalidGuess(_)));
    assert!(!round.is_awaiting_reply());
    assert_eq!(round.attempt_count(), 0);

    let pending = round.prepare_submit("crane").expect("lowercase accepted");
    assert_eq!(pending.word().as_str(), "CRANE");
}

#[test]
fn second_submit_while_outstanding_is_rejected() {
    let mut round = machine();
    let pending = round.prepare_submit("CRANE").expect("first");
    assert_eq!(
        round.prepare_submit("BOOST"),
        Err(RoundError::RequestInFlight)
    );

    round.apply_guess(pending, Ok(evaluation([Gray; 5])));
    assert!(round.prepare_submit("BOOST").is_ok());
}

#[test]
fn recorded_guess_updates_attempts_history_and_keyboard() {
    let mut round = machine();
    guess(&mut round, "CRANE", evaluation([Gray; 5]));
    let applied = guess(
        &mut round,
        "BOOST",
        evaluation([Yellow, Gray, Gray, Gray, Gray]),
    );

    let GuessApplied::Recorded {
        attempt,
        keyboard,
        ended,
        ..
    } = applied
    else {
        panic!("expected recorded guess");
    };
    assert_eq!(attempt, 2);
    assert!(ended.is_none());
    assert!(keyboard.contains(&('B', Yellow)));
    assert_eq!(round.history().len(), 2);
    assert_eq!(round.overlay().get('C'), Some(Gray));
    assert_eq!(round.overlay().get('B'), Some(Yellow));
    assert_eq!(round.overlay().get('T'), Some(Gray));
}

#[test]
fn service_rejection_consumes_no_attempt() {
    let mut round = machine();
    let pending = round.prepare_submit("XXXXX").expect("syntactically valid");
    let applied = round.apply_guess(
        pending,
        Err(ServiceError::rejected(ErrorCode::Validation, "Not in word list")),
    );
    assert_eq!(
        applied,
        GuessApplied::Rejected {
            message: "Not in word list".into()
        }
    );
    assert_eq!(round.attempt_count(), 0);
    assert!(round.is_active());
    assert!(!round.is_awaiting_reply());
}

#[test]
fn transport_failure_keeps_round_active_and_retryable() {
    let mut round = machine();
    let pending = round.prepare_submit("CRANE").expect("submit");
    let applied = round.apply_guess(
        pending,
        Err(ServiceError::Transport("connection refused".into())),
    );
    assert!(matches!(applied, GuessApplied::TransportFailed { .. }));
    assert_eq!(round.attempt_count(), 0);
    assert!(round.is_active());
    assert!(round.prepare_submit("CRANE").is_ok());
}

#[test]
fn short_feedback_is_treated_as_malformed_reply() {
    let mut round = machine();
    let pending = round.prepare_submit("CRANE").expect("submit");
    let mut reply = evaluation([Gray; 5]);
    reply.feedback.pop();
    let applied = round.apply_guess(pending, Ok(reply));
    assert!(matches!(
        applied,
        GuessApplied::TransportFailed {
            error: ServiceError::MalformedResponse(_)
        }
    ));
    assert_eq!(round.attempt_count(), 0);
    assert!(round.overlay().is_empty());
}

#[test]
fn sixth_miss_ends_round_as_loss_and_refuses_seventh() {
    let mut round = machine();
    for word in ["CRANE", "BOOST", "PIGMY", "FJORD", "WALTZ"] {
        guess(&mut round, word, evaluation([Gray; 5]));
    }
    assert!(round.is_active());

    let applied = guess(&mut round, "QUICK", evaluation([Gray; 5]));
    let GuessApplied::Recorded {
        ended: Some(summary),
        ..
    } = applied
    else {
        panic!("sixth guess should end the round");
    };
    assert_eq!(summary.outcome, RoundOutcome::Loss);
    assert_eq!(summary.reason, EndReason::AttemptsExhausted);
    assert_eq!(round.phase(), RoundPhase::Ended);
    assert_eq!(round.outcome(), Some(RoundOutcome::Loss));
    assert_eq!(round.attempt_count(), 6);
    assert!(!round.countdown().is_running());
    assert_eq!(round.prepare_submit("EXTRA"), Err(RoundError::NotActive));
}

#[test]
fn server_win_on_fourth_attempt_ends_round() {
    let mut round = machine();
    for word in ["CRANE", "BOOST", "PIGMY"] {
        guess(&mut round, word, evaluation([Gray; 5]));
    }
    let mut winning = evaluation([Green; 5]);
    winning.game_over = true;
    winning.result = Some(RoundStatus::Win);
    winning.score = Some(21.4);
    winning.correct_word = Some("TRUTH".into());
    let applied = guess(&mut round, "TRUTH", winning);

    let GuessApplied::Recorded {
        ended: Some(summary),
        ..
    } = applied
    else {
        panic!("win should end the round");
    };
    assert_eq!(summary.outcome, RoundOutcome::Win);
    assert_eq!(summary.reason, EndReason::Solved);
    assert_eq!(summary.score, Some(21.4));
    assert_eq!(summary.correct_word.as_deref(), Some("TRUTH"));
    assert_eq!(round.outcome(), Some(RoundOutcome::Win));
    assert!(!round.is_active());
    assert!(!round.countdown().is_running());
    assert_eq!(round.attempt_count(), 4);
}

#[test]
fn server_declared_loss_before_attempt_limit() {
    let mut round = machine();
    let mut reply = evaluation([Gray; 5]);
    reply.game_over = true;
    reply.result = Some(RoundStatus::Loss);
    let GuessApplied::Recorded {
        ended: Some(summary),
        ..
    } = guess(&mut round, "CRANE", reply)
    else {
        panic!("declared loss should end the round");
    };
    assert_eq!(summary.reason, EndReason::ServerDeclared);
    assert_eq!(round.outcome(), Some(RoundOutcome::Loss));
}

#[test]
fn ticks_update_remaining_time() {
    let mut round = machine();
    let signal = tick(&round, 239);
    assert_eq!(
        round.handle_timer(signal),
        Some(TimerUpdate::Tick {
            remaining_secs: 239
        })
    );
    assert_eq!(round.remaining_secs(), 239);
}

#[test]
fn expiry_after_three_attempts_forces_loss() {
    let mut round = machine();
    for word in ["CRANE", "BOOST", "PIGMY"] {
        guess(&mut round, word, evaluation([Gray; 5]));
    }
    let signal = tick(&round, 0);
    let Some(TimerUpdate::Expired(summary)) = round.handle_timer(signal) else {
        panic!("reaching zero should expire the round");
    };
    assert_eq!(summary.outcome, RoundOutcome::Loss);
    assert_eq!(summary.reason, EndReason::TimeExpired);
    assert_eq!(summary.attempts, 3);
    assert_eq!(round.remaining_secs(), 0);
    assert!(!round.is_active());
    assert_eq!(round.prepare_submit("FJORD"), Err(RoundError::NotActive));
    assert_eq!(round.attempt_count(), 3);
}

#[test]
fn expiry_signal_after_zero_tick_is_ignored() {
    let mut round = machine();
    let zero = tick(&round, 0);
    let expiry = expired(&round);
    assert!(matches!(
        round.handle_timer(zero),
        Some(TimerUpdate::Expired(_))
    ));
    assert_eq!(round.handle_timer(expiry), None);
}

#[test]
fn late_reply_after_expiry_is_discarded() {
    let mut round = machine();
    guess(&mut round, "CRANE", evaluation([Gray; 5]));
    let pending = round.prepare_submit("BOOST").expect("in flight");

    let signal = expired(&round);
    assert!(matches!(
        round.handle_timer(signal),
        Some(TimerUpdate::Expired(_))
    ));

    let mut winning = evaluation([Green; 5]);
    winning.game_over = true;
    winning.result = Some(RoundStatus::Win);
    let applied = round.apply_guess(pending, Ok(winning));

    assert_eq!(applied, GuessApplied::Discarded);
    assert_eq!(round.attempt_count(), 1);
    assert_eq!(round.outcome(), Some(RoundOutcome::Loss));
    assert_eq!(round.overlay().get('B'), None);
    assert_eq!(
        round.summary().map(|summary| summary.reason),
        Some(EndReason::TimeExpired)
    );
}

#[test]
fn stale_timer_signal_from_previous_round_is_ignored() {
    let mut round = machine();
    let stale = tick(&round, 0);
    round.begin(RoundRules::default());

    assert_eq!(round.handle_timer(stale), None);
    assert!(round.is_active());
    assert_eq!(round.remaining_secs(), 240);
}

#[test]
fn new_round_resets_everything() {
    let mut round = machine();
    let mut winning = evaluation([Green; 5]);
    winning.game_over = true;
    winning.result = Some(RoundStatus::Win);
    guess(&mut round, "TRUTH", winning);
    assert_eq!(round.outcome(), Some(RoundOutcome::Win));

    let second = round.begin(RoundRules::default());
    assert_eq!(second, 2);
    assert_eq!(round.attempt_count(), 0);
    assert_eq!(round.outcome(), None);
    assert!(round.overlay().is_empty());
    assert!(round.summary().is_none());
    assert_eq!(round.countdown().starts, 2);
}

#[test]
fn reply_from_previous_round_is_discarded_after_restart() {
    let mut round = machine();
    let pending = round.prepare_submit("CRANE").expect("in flight");
    round.begin(RoundRules::default());

    let applied = round.apply_guess(pending, Ok(evaluation([Green; 5])));
    assert_eq!(applied, GuessApplied::Discarded);
    assert_eq!(round.attempt_count(), 0);
    assert!(round.overlay().is_empty());
}

#[test]
fn abandon_returns_to_idle_and_stops_countdown() {
    let mut round = machine();
    let pending = round.prepare_submit("CRANE").expect("in flight");
    round.abandon();

    assert_eq!(round.phase(), RoundPhase::Idle);
    assert!(!round.countdown().is_running());
    assert_eq!(
        round.apply_guess(pending, Ok(evaluation([Gray; 5]))),
        GuessApplied::Discarded
    );
}
