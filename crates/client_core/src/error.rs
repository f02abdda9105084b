use shared::{domain::GuessValidationError, error::ErrorCode};
use thiserror::Error;

use crate::router::RouteError;

/// Local refusals raised before any request leaves the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoundError {
    #[error(transparent)]
    InvalidGuess(#[from] GuessValidationError),
    #[error("a guess is already being evaluated")]
    RequestInFlight,
    #[error("no active round")]
    NotActive,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("{message}")]
    Rejected { code: ErrorCode, message: String },
    #[error("service unreachable: {0}")]
    Transport(String),
    #[error("unexpected service response: {0}")]
    MalformedResponse(String),
}

impl ServiceError {
    pub fn rejected(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Rejected {
            code,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::MalformedResponse(value.to_string())
        } else {
            Self::Transport(value.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    LocalValidation,
    ServiceRejection,
    Auth,
    Transport,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Round(#[from] RoundError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Route(#[from] RouteError),
    #[error("{0}")]
    Validation(String),
}

impl SessionError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Round(_) | Self::Validation(_) => ErrorCategory::LocalValidation,
            Self::Route(RouteError::SignInRequired) => ErrorCategory::Auth,
            Self::Service(ServiceError::Rejected {
                code: ErrorCode::Unauthorized,
                ..
            }) => ErrorCategory::Auth,
            Self::Service(ServiceError::Rejected { .. }) => ErrorCategory::ServiceRejection,
            Self::Service(ServiceError::Transport(_) | ServiceError::MalformedResponse(_)) => {
                ErrorCategory::Transport
            }
        }
    }

    pub fn requires_reauth(&self) -> bool {
        self.category() == ErrorCategory::Auth
    }
}
