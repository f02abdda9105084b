use shared::domain::View;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTrigger {
    Authenticated,
    ShowRules,
    StartRound,
    OpenLeaderboard,
    Logout,
}

impl RouteTrigger {
    pub fn target(self) -> View {
        match self {
            Self::Authenticated | Self::ShowRules => View::Rules,
            Self::StartRound => View::Game,
            Self::OpenLeaderboard => View::Leaderboard,
            Self::Logout => View::Auth,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("sign in first")]
    SignInRequired,
}

/// Side effects the caller owes after a view change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewEntry {
    pub previous: View,
    pub view: View,
    pub refresh_identity: bool,
    pub fetch_leaderboard: bool,
    pub tear_down_round: bool,
}

#[derive(Debug, Clone)]
pub struct ViewRouter {
    current: View,
}

impl Default for ViewRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewRouter {
    pub fn new() -> Self {
        Self {
            current: View::Auth,
        }
    }

    pub fn current(&self) -> View {
        self.current
    }

    pub fn apply(&mut self, trigger: RouteTrigger) -> Result<ViewEntry, RouteError> {
        let signed_out = self.current == View::Auth;
        let needs_session = !matches!(trigger, RouteTrigger::Authenticated | RouteTrigger::Logout);
        if signed_out && needs_session {
            return Err(RouteError::SignInRequired);
        }

        let previous = self.current;
        let view = trigger.target();
        self.current = view;
        debug!(?previous, ?view, ?trigger, "router: view changed");

        Ok(ViewEntry {
            previous,
            view,
            refresh_identity: matches!(view, View::Rules | View::Game),
            fetch_leaderboard: view == View::Leaderboard,
            tear_down_round: view == View::Auth,
        })
    }
}
