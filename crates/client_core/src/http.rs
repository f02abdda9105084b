//! reqwest-backed implementation of the game server collaborators.
//!
//! The server keeps the session in a cookie, so one client with a cookie
//! store is shared by every call.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{GuessWord, Identity},
    error::{ApiError, ErrorCode},
    protocol::{
        GuessEvaluation, GuessRequest, GuessResponse, LeaderboardEntry, LoginRequest,
        MessageResponse, PlayerStats, ProfileUpdateRequest, RegisterRequest, RegisterResponse,
        StartRoundResponse,
    },
};
use tracing::debug;
use url::Url;

use crate::{
    error::ServiceError,
    service::{RoundService, SessionService, StatsService},
};

const LOGIN_PATH: &str = "api/login";
const REGISTER_PATH: &str = "api/register";
const LOGOUT_PATH: &str = "api/logout";
const IDENTITY_PATH: &str = "api/me";
const PROFILE_PATH: &str = "api/profile";
const STATS_PATH: &str = "api/stats";
const START_ROUND_PATH: &str = "api/start_game";
const GUESS_PATH: &str = "api/guess";
const LEADERBOARD_PATH: &str = "api/leaderboard";

pub struct HttpGameApi {
    http: Client,
    base: Url,
}

impl HttpGameApi {
    pub fn new(server_url: &str, request_timeout: Duration) -> Result<Self> {
        let mut base = Url::parse(server_url)
            .with_context(|| format!("invalid server url: {server_url}"))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(anyhow!("server_url must start with http:// or https://"));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = Client::builder()
            .cookie_store(true)
            .timeout(request_timeout)
            .build()
            .context("failed to build http client")?;

        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ServiceError> {
        self.base
            .join(path)
            .map_err(|err| ServiceError::Transport(format!("invalid endpoint {path}: {err}")))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ServiceError> {
        let url = self.endpoint(path)?;
        debug!(%url, "http: GET");
        read_reply(self.http.get(url).send().await?).await
    }

    async fn post<T: DeserializeOwned>(&self, path: &str) -> Result<T, ServiceError> {
        let url = self.endpoint(path)?;
        debug!(%url, "http: POST");
        read_reply(self.http.post(url).send().await?).await
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ServiceError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        debug!(%url, %method, "http: request");
        let response = self.http.request(method, url).json(body).send().await?;
        read_reply(response).await
    }
}

async fn read_reply<T: DeserializeOwned>(response: Response) -> Result<T, ServiceError> {
    let status = response.status();
    let body = response.bytes().await?;
    if !status.is_success() {
        return Err(failure_from(status, &body));
    }
    serde_json::from_slice(&body).map_err(|err| ServiceError::MalformedResponse(err.to_string()))
}

fn failure_from(status: StatusCode, body: &[u8]) -> ServiceError {
    let message = serde_json::from_slice::<ApiError>(body)
        .map(|reply| reply.error)
        .unwrap_or_else(|_| format!("server returned {status}"));
    if status.is_server_error() {
        ServiceError::Transport(message)
    } else {
        ServiceError::rejected(ErrorCode::from_status(status.as_u16()), message)
    }
}

#[async_trait]
impl SessionService for HttpGameApi {
    async fn current_identity(&self) -> Result<Identity, ServiceError> {
        self.get(IDENTITY_PATH).await
    }

    async fn login(&self, request: &LoginRequest) -> Result<Identity, ServiceError> {
        self.send_json(Method::POST, LOGIN_PATH, request).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<(), ServiceError> {
        let reply: RegisterResponse = self
            .send_json(Method::POST, REGISTER_PATH, request)
            .await?;
        debug!(role = ?reply.role, "http: account registered");
        Ok(())
    }

    async fn logout(&self) -> Result<(), ServiceError> {
        let _: MessageResponse = self.post(LOGOUT_PATH).await?;
        Ok(())
    }

    async fn update_profile(&self, request: &ProfileUpdateRequest) -> Result<(), ServiceError> {
        let _: MessageResponse = self
            .send_json(Method::PUT, PROFILE_PATH, request)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl RoundService for HttpGameApi {
    async fn start_round(&self) -> Result<StartRoundResponse, ServiceError> {
        self.post(START_ROUND_PATH).await
    }

    async fn submit_guess(&self, guess: &GuessWord) -> Result<GuessEvaluation, ServiceError> {
        let request = GuessRequest {
            guess: guess.clone(),
        };
        let reply: GuessResponse = self
            .send_json(Method::POST, GUESS_PATH, &request)
            .await?;
        match reply {
            GuessResponse::Evaluated(evaluation) => Ok(evaluation),
            GuessResponse::Rejected(ApiError { error }) => {
                Err(ServiceError::rejected(ErrorCode::Validation, error))
            }
        }
    }
}

#[async_trait]
impl StatsService for HttpGameApi {
    async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, ServiceError> {
        self.get(LEADERBOARD_PATH).await
    }

    async fn player_stats(&self) -> Result<PlayerStats, ServiceError> {
        self.get(STATS_PATH).await
    }
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
