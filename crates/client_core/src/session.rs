//! Session orchestration: identity, navigation, the active round and its
//! countdown, all owned by one [`GameSession`].
//!
//! State lives behind a single `tokio::sync::Mutex`. The lock is never held
//! across a service call; guess replies and timer signals are each applied
//! under it, so they interleave but never overlap.

use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use shared::{
    domain::{Identity, RoundRules, View, MAX_ATTEMPTS, ROUND_DEADLINE},
    protocol::{
        LeaderboardEntry, LoginRequest, PlayerStats, ProfileUpdateRequest, RegisterRequest,
        StartRoundResponse,
    },
};
use tokio::sync::{broadcast, mpsc, Mutex};
use tracing::{debug, info, warn};

use crate::{
    error::{ErrorCategory, SessionError},
    events::{GameEvent, Notice},
    round::{GuessApplied, RoundSnapshot, RoundStateMachine, TimerUpdate},
    router::{RouteError, RouteTrigger, ViewEntry, ViewRouter},
    service::GameServices,
    timer::{TimerController, TimerSignal},
};

const EVENT_CAPACITY: usize = 1024;
const FALLBACK_LABEL: &str = "Profile";

/// Who is signed in, if anyone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    identity: Option<Identity>,
}

impl SessionContext {
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.identity.is_some()
    }

    pub fn label(&self) -> &str {
        self.identity
            .as_ref()
            .map_or(FALLBACK_LABEL, Identity::label)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub username: String,
    pub password: String,
    pub display_name: Option<String>,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    SignedIn(Identity),
    /// The account exists but the automatic sign-in did not go through.
    SignInRequired,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSnapshot {
    pub identity: Identity,
    pub stats: Option<PlayerStats>,
}

struct SessionState {
    context: SessionContext,
    router: ViewRouter,
    round: RoundStateMachine<TimerController>,
}

pub struct GameSession {
    services: GameServices,
    inner: Mutex<SessionState>,
    events: broadcast::Sender<GameEvent>,
}

impl GameSession {
    /// Must be called from within a tokio runtime: the timer pump is spawned
    /// here and lives as long as the session.
    pub fn new(services: GameServices) -> Arc<Self> {
        let (timer, signals) = TimerController::channel();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let session = Arc::new(Self {
            services,
            inner: Mutex::new(SessionState {
                context: SessionContext::default(),
                router: ViewRouter::new(),
                round: RoundStateMachine::new(timer),
            }),
            events,
        });
        spawn_timer_pump(Arc::downgrade(&session), signals);
        session
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<GameEvent> {
        self.events.subscribe()
    }

    pub async fn current_view(&self) -> View {
        self.inner.lock().await.router.current()
    }

    pub async fn identity(&self) -> Option<Identity> {
        self.inner.lock().await.context.identity.clone()
    }

    pub async fn round_snapshot(&self) -> RoundSnapshot {
        self.inner.lock().await.round.snapshot()
    }

    /// Picks up a session the server still remembers. Not being signed in is
    /// the normal case here, so failures stay silent.
    pub async fn resume(&self) -> Option<Identity> {
        match self.services.session.current_identity().await {
            Ok(identity) => {
                self.enter_signed_in(identity.clone()).await;
                Some(identity)
            }
            Err(err) => {
                debug!(%err, "session: nothing to resume");
                None
            }
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Identity, SessionError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(self.report(required_fields()));
        }

        let request = LoginRequest {
            username: username.to_owned(),
            password: password.to_owned(),
        };
        let identity = self
            .services
            .session
            .login(&request)
            .await
            .map_err(|err| self.report(err.into()))?;

        self.enter_signed_in(identity.clone()).await;
        self.notify(Notice::success(format!(
            "Welcome back, {}!",
            identity.label()
        )));
        Ok(identity)
    }

    pub async fn register(
        &self,
        form: RegistrationForm,
    ) -> Result<RegistrationOutcome, SessionError> {
        let username = form.username.trim().to_owned();
        if username.is_empty() || form.password.is_empty() {
            return Err(self.report(required_fields()));
        }
        let display_name = form
            .display_name
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| username.clone());

        let request = RegisterRequest {
            username: username.clone(),
            password: form.password.clone(),
            display_name,
            email: form.email.trim().to_owned(),
        };
        self.services
            .session
            .register(&request)
            .await
            .map_err(|err| self.report(err.into()))?;
        info!(%username, "session: account registered");
        self.notify(Notice::success("Account created! Signing you in..."));

        let credentials = LoginRequest {
            username,
            password: form.password,
        };
        match self.services.session.login(&credentials).await {
            Ok(identity) => {
                self.enter_signed_in(identity.clone()).await;
                Ok(RegistrationOutcome::SignedIn(identity))
            }
            Err(err) => {
                warn!(%err, "session: automatic sign-in after registration failed");
                self.notify(Notice::success("Registered! Please sign in."));
                Ok(RegistrationOutcome::SignInRequired)
            }
        }
    }

    /// Always ends the local session, even when the server cannot be told.
    pub async fn logout(&self) {
        if let Err(err) = self.services.session.logout().await {
            debug!(%err, "session: server logout failed, clearing locally");
        }

        {
            let mut guard = self.inner.lock().await;
            if let Some(identity) = guard.context.identity.take() {
                info!(username = %identity.username, "session: signed out");
            }
            if let Err(err) = self.navigate(&mut guard, RouteTrigger::Logout) {
                warn!(%err, "session: logout navigation failed");
            }
            self.emit(GameEvent::IdentityLabel(guard.context.label().to_owned()));
        }
        self.notify(Notice::success("Logged out successfully."));
    }

    /// Asks the server for a fresh round; local state only changes once the
    /// server has accepted.
    pub async fn start_round(&self) -> Result<u64, SessionError> {
        {
            let guard = self.inner.lock().await;
            if guard.router.current() == View::Auth {
                return Err(self.report(RouteError::SignInRequired.into()));
            }
        }

        let reply = self
            .services
            .rounds
            .start_round()
            .await
            .map_err(|err| self.report(err.into()))?;
        let rules = rules_from(&reply);

        let mut guard = self.inner.lock().await;
        self.navigate(&mut guard, RouteTrigger::StartRound)
            .map_err(|err| self.report(err.into()))?;
        let round_id = guard.round.begin(rules);
        self.emit(GameEvent::RoundStarted {
            round_id,
            max_attempts: rules.max_attempts,
            deadline_secs: guard.round.remaining_secs(),
        });
        self.emit(GameEvent::InputLocked(false));
        Ok(round_id)
    }

    /// Validates locally, sends exactly one request, then applies the reply
    /// unless the round moved on while it was outstanding.
    pub async fn submit_guess(&self, input: &str) -> Result<GuessApplied, SessionError> {
        let pending = {
            let mut guard = self.inner.lock().await;
            guard
                .round
                .prepare_submit(input)
                .map_err(|err| self.report(err.into()))?
        };
        self.emit(GameEvent::InputLocked(true));

        let reply = self.services.rounds.submit_guess(pending.word()).await;

        let mut guard = self.inner.lock().await;
        let round_id = pending.round_id();
        let applied = guard.round.apply_guess(pending, reply);
        match &applied {
            GuessApplied::Recorded {
                feedback,
                attempt,
                keyboard,
                ended,
            } => {
                self.emit(GameEvent::GuessRecorded {
                    round_id,
                    attempt: *attempt,
                    feedback: feedback.clone(),
                    keyboard: keyboard.clone(),
                });
                match ended {
                    Some(summary) => self.emit(GameEvent::RoundEnded(summary.clone())),
                    None => self.emit(GameEvent::InputLocked(false)),
                }
            }
            GuessApplied::Rejected { message } => {
                self.emit(GameEvent::InputLocked(false));
                self.notify(Notice::error(ErrorCategory::ServiceRejection, message));
            }
            GuessApplied::TransportFailed { error } => {
                self.emit(GameEvent::InputLocked(false));
                self.notify(Notice::error(
                    ErrorCategory::Transport,
                    format!("Connection error. Try again. ({error})"),
                ));
            }
            GuessApplied::Discarded => {}
        }
        Ok(applied)
    }

    pub async fn show_rules(&self) -> Result<(), SessionError> {
        let mut guard = self.inner.lock().await;
        self.navigate(&mut guard, RouteTrigger::ShowRules)
            .map_err(|err| self.report(err.into()))?;
        Ok(())
    }

    /// Enters the leaderboard view and fetches a fresh ranking every time.
    pub async fn show_leaderboard(&self) -> Result<Vec<LeaderboardEntry>, SessionError> {
        let entry = {
            let mut guard = self.inner.lock().await;
            self.navigate(&mut guard, RouteTrigger::OpenLeaderboard)
                .map_err(|err| self.report(err.into()))?
        };
        if !entry.fetch_leaderboard {
            return Ok(Vec::new());
        }

        let entries = self
            .services
            .stats
            .leaderboard()
            .await
            .map_err(|err| self.report(err.into()))?;
        debug!(entries = entries.len(), "session: leaderboard loaded");
        self.emit(GameEvent::LeaderboardLoaded(entries.clone()));
        Ok(entries)
    }

    /// Identity and stats for the profile panel. Either half may be missing
    /// on the server without failing the whole load.
    pub async fn load_profile(&self) -> Result<ProfileSnapshot, SessionError> {
        let stored = self.signed_in_identity().await?;

        let identity = match self.services.session.current_identity().await {
            Ok(identity) => {
                self.inner.lock().await.context.identity = Some(identity.clone());
                identity
            }
            Err(err) => {
                debug!(%err, "session: identity refresh failed, using cached identity");
                stored
            }
        };
        let stats = match self.services.stats.player_stats().await {
            Ok(stats) => Some(stats),
            Err(err) => {
                debug!(%err, "session: player stats unavailable");
                None
            }
        };

        Ok(ProfileSnapshot { identity, stats })
    }

    pub async fn update_profile(
        &self,
        display_name: &str,
        email: &str,
    ) -> Result<Identity, SessionError> {
        let display_name = display_name.trim();
        let email = email.trim();
        if display_name.is_empty() {
            return Err(self.report(SessionError::Validation(
                "Display name cannot be empty.".into(),
            )));
        }
        self.signed_in_identity().await?;

        let request = ProfileUpdateRequest {
            display_name: display_name.to_owned(),
            email: email.to_owned(),
        };
        self.services
            .session
            .update_profile(&request)
            .await
            .map_err(|err| self.report(err.into()))?;

        let updated = {
            let mut guard = self.inner.lock().await;
            let Some(identity) = guard.context.identity.as_mut() else {
                return Err(self.report(RouteError::SignInRequired.into()));
            };
            identity.display_name = Some(request.display_name);
            identity.email = (!request.email.is_empty()).then_some(request.email);
            let updated = identity.clone();
            self.emit(GameEvent::IdentityLabel(guard.context.label().to_owned()));
            updated
        };
        info!(username = %updated.username, "session: profile updated");
        self.notify(Notice::success("Profile updated!"));
        Ok(updated)
    }

    async fn signed_in_identity(&self) -> Result<Identity, SessionError> {
        let identity = self.inner.lock().await.context.identity.clone();
        identity.ok_or_else(|| self.report(RouteError::SignInRequired.into()))
    }

    async fn enter_signed_in(&self, identity: Identity) {
        let mut guard = self.inner.lock().await;
        info!(username = %identity.username, role = ?identity.role, "session: signed in");
        // A different account never inherits the previous round.
        guard.round.abandon();
        guard.context.identity = Some(identity);
        if let Err(err) = self.navigate(&mut guard, RouteTrigger::Authenticated) {
            warn!(%err, "session: post sign-in navigation failed");
        }
    }

    async fn apply_timer_signal(&self, signal: TimerSignal) {
        let mut guard = self.inner.lock().await;
        match guard.round.handle_timer(signal) {
            Some(TimerUpdate::Tick { remaining_secs }) => {
                self.emit(GameEvent::TimerTick { remaining_secs });
            }
            Some(TimerUpdate::Expired(summary)) => {
                self.emit(GameEvent::TimerTick { remaining_secs: 0 });
                self.emit(GameEvent::RoundEnded(summary));
                self.notify(Notice::info("Time's up!"));
            }
            None => {}
        }
    }

    fn navigate(
        &self,
        state: &mut SessionState,
        trigger: RouteTrigger,
    ) -> Result<ViewEntry, RouteError> {
        let entry = state.router.apply(trigger)?;
        if entry.tear_down_round {
            state.round.abandon();
        }
        if entry.refresh_identity {
            self.emit(GameEvent::IdentityLabel(state.context.label().to_owned()));
        }
        self.emit(GameEvent::ViewChanged(entry.view));
        Ok(entry)
    }

    fn report(&self, err: SessionError) -> SessionError {
        let category = err.category();
        match category {
            ErrorCategory::LocalValidation => debug!(%err, "session: input refused"),
            _ => warn!(?category, %err, "session: operation failed"),
        }
        self.notify(Notice::error(category, err.to_string()));
        err
    }

    fn notify(&self, notice: Notice) {
        self.emit(GameEvent::Notice(notice));
    }

    fn emit(&self, event: GameEvent) {
        let _ = self.events.send(event);
    }
}

fn required_fields() -> SessionError {
    SessionError::Validation("Please fill in all required fields.".into())
}

/// Round limits are fixed. A start reply that states other limits is logged
/// and otherwise ignored.
fn rules_from(reply: &StartRoundResponse) -> RoundRules {
    let rules = RoundRules::default();
    let attempts_differ = reply
        .max_attempts
        .is_some_and(|attempts| attempts != MAX_ATTEMPTS);
    let deadline_differs = reply
        .max_time
        .map(Duration::from_secs)
        .is_some_and(|deadline| deadline != ROUND_DEADLINE);
    if attempts_differ || deadline_differs {
        warn!(
            max_attempts = ?reply.max_attempts,
            max_time = ?reply.max_time,
            "session: start reply states other round limits, keeping the standard ones"
        );
    }
    rules
}

fn spawn_timer_pump(session: Weak<GameSession>, mut signals: mpsc::UnboundedReceiver<TimerSignal>) {
    tokio::spawn(async move {
        while let Some(signal) = signals.recv().await {
            let Some(session) = session.upgrade() else {
                break;
            };
            session.apply_timer_signal(signal).await;
        }
        debug!("session: timer pump stopped");
    });
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
