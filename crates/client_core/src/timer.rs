//! Round countdown scheduled as a cancellable tokio task.
//!
//! Every `start`/`stop` advances the controller's epoch and each signal is
//! stamped with the epoch it was produced under. Consumers compare the stamp
//! with [`Countdown::epoch`] and drop anything older, so a tick that was
//! already queued when a countdown got cancelled can never be applied.

use std::time::Duration;

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::debug;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerSignalKind {
    Tick { remaining_secs: u32 },
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSignal {
    pub epoch: u64,
    pub kind: TimerSignalKind,
}

pub trait Countdown: Send {
    /// Cancel any running countdown, then schedule a fresh one.
    fn start(&mut self, deadline: Duration);
    fn stop(&mut self);
    fn epoch(&self) -> u64;
    fn is_running(&self) -> bool;
}

pub struct TimerController {
    signals: mpsc::UnboundedSender<TimerSignal>,
    period: Duration,
    epoch: u64,
    task: Option<JoinHandle<()>>,
}

impl TimerController {
    pub fn new(signals: mpsc::UnboundedSender<TimerSignal>) -> Self {
        Self::with_period(signals, TICK_PERIOD)
    }

    pub fn with_period(signals: mpsc::UnboundedSender<TimerSignal>, period: Duration) -> Self {
        Self {
            signals,
            period,
            epoch: 0,
            task: None,
        }
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TimerSignal>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl Countdown for TimerController {
    fn start(&mut self, deadline: Duration) {
        self.stop();

        let epoch = self.epoch;
        let period = self.period;
        let signals = self.signals.clone();
        let mut remaining_secs = u32::try_from(deadline.as_secs()).unwrap_or(u32::MAX);
        debug!(epoch, remaining_secs, "timer: countdown started");

        self.task = Some(tokio::spawn(async move {
            if remaining_secs == 0 {
                let _ = signals.send(TimerSignal {
                    epoch,
                    kind: TimerSignalKind::Expired,
                });
                return;
            }

            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                remaining_secs -= 1;
                let tick = TimerSignal {
                    epoch,
                    kind: TimerSignalKind::Tick { remaining_secs },
                };
                if signals.send(tick).is_err() {
                    return;
                }
                if remaining_secs == 0 {
                    let _ = signals.send(TimerSignal {
                        epoch,
                        kind: TimerSignalKind::Expired,
                    });
                    debug!(epoch, "timer: countdown expired");
                    return;
                }
            }
        }));
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.epoch += 1;
    }

    fn epoch(&self) -> u64 {
        self.epoch
    }

    fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for TimerController {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
#[path = "tests/timer_tests.rs"]
mod tests;
