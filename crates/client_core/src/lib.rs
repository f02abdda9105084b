//! Client-side session engine for the Bulls & Bears word game.
//!
//! [`GameSession`] owns the signed-in identity, the current view, and the
//! active round with its countdown. Presentation layers drive it through its
//! async operations and observe it through [`GameEvent`]s.

pub mod error;
pub mod events;
pub mod http;
pub mod overlay;
pub mod round;
pub mod router;
pub mod service;
pub mod session;
pub mod timer;

pub use error::{ErrorCategory, RoundError, ServiceError, SessionError};
pub use events::{GameEvent, Notice, NoticeKind};
pub use http::HttpGameApi;
pub use overlay::{KeyboardOverlay, KEYBOARD_ROWS};
pub use round::{
    EndReason, GuessApplied, PendingGuess, RoundPhase, RoundSnapshot, RoundStateMachine,
    RoundSummary, TimerUpdate,
};
pub use router::{RouteError, RouteTrigger, ViewEntry, ViewRouter};
pub use service::{GameServices, RoundService, SessionService, StatsService};
pub use session::{
    GameSession, ProfileSnapshot, RegistrationForm, RegistrationOutcome, SessionContext,
};
pub use timer::{Countdown, TimerController, TimerSignal, TimerSignalKind, TICK_PERIOD};
