use serde::{Deserialize, Serialize};

use crate::{
    domain::{GuessWord, LetterClass, Role, RoundOutcome},
    error::ApiError,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub display_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileUpdateRequest {
    pub display_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartRoundResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_time: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuessRequest {
    pub guess: GuessWord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundStatus {
    Playing,
    Win,
    Loss,
}

impl RoundStatus {
    pub fn outcome(self) -> Option<RoundOutcome> {
        match self {
            Self::Playing => None,
            Self::Win => Some(RoundOutcome::Win),
            Self::Loss => Some(RoundOutcome::Loss),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuessEvaluation {
    pub feedback: Vec<LetterClass>,
    #[serde(default)]
    pub game_over: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<RoundStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_word: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_taken: Option<f64>,
}

/// Body of `/api/guess`: either a rejection or an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GuessResponse {
    Rejected(ApiError),
    Evaluated(GuessEvaluation),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub score: f64,
    pub attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_taken: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub played_at: Option<String>,
}

impl LeaderboardEntry {
    pub fn label(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.username,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub total_games: u32,
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    pub win_rate: f64,
    pub best_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guess_response_distinguishes_rejection_from_evaluation() {
        let rejected: GuessResponse =
            serde_json::from_str(r#"{"error":"Guess must be exactly 5 letters."}"#)
                .expect("rejection");
        assert_eq!(
            rejected,
            GuessResponse::Rejected(ApiError::new("Guess must be exactly 5 letters."))
        );

        let evaluated: GuessResponse = serde_json::from_str(
            r#"{"feedback":["green","yellow","gray","gray","green"],"game_over":false,
                "score":0,"attempts":2,"result":"PLAYING","correct_word":null,"time_taken":12.4}"#,
        )
        .expect("evaluation");
        let GuessResponse::Evaluated(evaluation) = evaluated else {
            panic!("expected evaluation");
        };
        assert_eq!(evaluation.feedback[1], LetterClass::Yellow);
        assert_eq!(evaluation.result, Some(RoundStatus::Playing));
        assert_eq!(evaluation.correct_word, None);
        assert_eq!(evaluation.attempts, Some(2));
    }

    #[test]
    fn guess_request_serializes_plain_word() {
        let request = GuessRequest {
            guess: GuessWord::parse("boost").expect("valid"),
        };
        assert_eq!(
            serde_json::to_string(&request).expect("json"),
            r#"{"guess":"BOOST"}"#
        );
    }

    #[test]
    fn leaderboard_entry_tolerates_missing_time() {
        let entry: LeaderboardEntry = serde_json::from_str(
            r#"{"username":"bob","display_name":"Bob","score":18.5,"attempts":3,"time_taken":null,"result":"WIN"}"#,
        )
        .expect("entry");
        assert_eq!(entry.label(), "Bob");
        assert_eq!(entry.time_taken, None);
    }
}
