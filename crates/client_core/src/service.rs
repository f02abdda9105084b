use std::sync::Arc;

use async_trait::async_trait;
use shared::{
    domain::{GuessWord, Identity},
    protocol::{
        GuessEvaluation, LeaderboardEntry, LoginRequest, PlayerStats, ProfileUpdateRequest,
        RegisterRequest, StartRoundResponse,
    },
};

use crate::error::ServiceError;

#[async_trait]
pub trait SessionService: Send + Sync {
    async fn current_identity(&self) -> Result<Identity, ServiceError>;
    async fn login(&self, request: &LoginRequest) -> Result<Identity, ServiceError>;
    async fn register(&self, request: &RegisterRequest) -> Result<(), ServiceError>;
    async fn logout(&self) -> Result<(), ServiceError>;
    async fn update_profile(&self, request: &ProfileUpdateRequest) -> Result<(), ServiceError>;
}

#[async_trait]
pub trait RoundService: Send + Sync {
    async fn start_round(&self) -> Result<StartRoundResponse, ServiceError>;
    /// `Err(ServiceError::Rejected)` means the guess was refused without
    /// consuming an attempt.
    async fn submit_guess(&self, guess: &GuessWord) -> Result<GuessEvaluation, ServiceError>;
}

#[async_trait]
pub trait StatsService: Send + Sync {
    async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, ServiceError>;
    async fn player_stats(&self) -> Result<PlayerStats, ServiceError>;
}

/// The three collaborators a [`crate::GameSession`] talks to.
#[derive(Clone)]
pub struct GameServices {
    pub session: Arc<dyn SessionService>,
    pub rounds: Arc<dyn RoundService>,
    pub stats: Arc<dyn StatsService>,
}

impl GameServices {
    /// Uses one backend for every collaborator.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: SessionService + RoundService + StatsService + 'static,
    {
        Self {
            session: backend.clone(),
            rounds: backend.clone(),
            stats: backend,
        }
    }
}
