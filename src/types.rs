//! Common types and data structures

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Round outcome as reported by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Player,
    Bot,
    Draw,
    /// No clear gesture; the round was not recorded
    Retry,
    #[serde(other)]
    Unknown,
}

/// Session status string. Unknown values are kept verbatim for display.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SessionPhase {
    #[default]
    Idle,
    Active,
    NeedsExpression,
    Completed,
    Other(String),
}

impl From<String> for SessionPhase {
    fn from(s: String) -> Self {
        match s.as_str() {
            "idle" => SessionPhase::Idle,
            "active" => SessionPhase::Active,
            "needs_expression" => SessionPhase::NeedsExpression,
            "completed" => SessionPhase::Completed,
            _ => SessionPhase::Other(s),
        }
    }
}

impl From<SessionPhase> for String {
    fn from(phase: SessionPhase) -> Self {
        phase.to_string()
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Active => "active",
            SessionPhase::NeedsExpression => "needs_expression",
            SessionPhase::Completed => "completed",
            SessionPhase::Other(s) => s,
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StartSessionRequest {
    pub player_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionStart {
    pub session_id: String,
    pub total_rounds: usize,
    pub status: SessionPhase,
}

/// Response of `play-round`
#[derive(Debug, Clone, Deserialize)]
pub struct RoundResult {
    pub session_id: String,
    pub round_number: usize,
    pub player_move: String,
    pub bot_move: String,
    pub outcome: Outcome,
    #[serde(default)]
    pub stats: BTreeMap<String, u32>,
    pub remaining_rounds: usize,
    pub status: SessionPhase,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub captured_at: Option<String>,
}

impl RoundResult {
    /// Frame votes for a move, zero when the backend omitted it
    pub fn votes(&self, mv: &str) -> u32 {
        self.stats.get(mv).copied().unwrap_or(0)
    }
}

/// Response of `final-expression`
#[derive(Debug, Clone, Deserialize)]
pub struct ExpressionResult {
    pub session_id: String,
    pub expression: String,
    #[serde(default)]
    pub stats: BTreeMap<String, f64>,
    pub cat_image_url: String,
    #[serde(default)]
    pub session_summary: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionStatus {
    pub session_id: String,
    pub status: SessionPhase,
    pub rounds_played: usize,
    pub total_rounds: usize,
}

/// Live labels from the preview pipeline
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreviewStatus {
    #[serde(default)]
    pub gesture_label: Option<String>,
    #[serde(default)]
    pub expression_label: Option<String>,
    #[serde(default)]
    pub timestamp: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub player: u32,
    pub bot: u32,
    pub draws: u32,
}

/// A round as stored in the backend history file
#[derive(Debug, Clone, Deserialize)]
pub struct RoundRecord {
    pub round_number: usize,
    pub player_move: String,
    pub bot_move: String,
    pub outcome: Outcome,
    #[serde(default)]
    pub stats: BTreeMap<String, u32>,
    #[serde(default)]
    pub captured_at: Option<String>,
}

/// One completed session from `/api/logs`
#[derive(Debug, Clone, Deserialize)]
pub struct SessionLogEntry {
    pub session_id: String,
    #[serde(default)]
    pub player_name: Option<String>,
    pub played_at: String,
    #[serde(default)]
    pub rounds: Vec<RoundRecord>,
    #[serde(default)]
    pub scoreboard: Scoreboard,
    #[serde(default)]
    pub final_expression: Option<String>,
    #[serde(default)]
    pub cat_image: Option<String>,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct LogsResponse {
    #[serde(default)]
    pub sessions: Vec<SessionLogEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_parses_known_and_unknown() {
        let phase: SessionPhase = serde_json::from_str(r#""needs_expression""#).unwrap();
        assert_eq!(phase, SessionPhase::NeedsExpression);

        let phase: SessionPhase = serde_json::from_str(r#""paused""#).unwrap();
        assert_eq!(phase, SessionPhase::Other("paused".into()));
        assert_eq!(phase.to_string(), "paused");
    }

    #[test]
    fn unknown_outcome_is_tolerated() {
        let outcome: Outcome = serde_json::from_str(r#""forfeit""#).unwrap();
        assert_eq!(outcome, Outcome::Unknown);
    }

    #[test]
    fn retry_round_deserializes_without_captured_at() {
        let json = r#"{
            "session_id": "abc",
            "round_number": 2,
            "player_move": "none",
            "bot_move": "pending",
            "outcome": "retry",
            "stats": {"rock": 1, "none": 20},
            "remaining_rounds": 2,
            "status": "active",
            "message": "No clear gesture detected."
        }"#;
        let round: RoundResult = serde_json::from_str(json).unwrap();
        assert_eq!(round.outcome, Outcome::Retry);
        assert_eq!(round.votes("rock"), 1);
        assert_eq!(round.votes("paper"), 0);
        assert!(round.captured_at.is_none());
    }

    #[test]
    fn log_entry_tolerates_missing_optionals() {
        let json = r#"{
            "session_id": "s1",
            "player_name": null,
            "played_at": "2024-05-01T10:00:00.123456",
            "scoreboard": {"player": 2, "bot": 1, "draws": 0}
        }"#;
        let entry: SessionLogEntry = serde_json::from_str(json).unwrap();
        assert!(entry.rounds.is_empty());
        assert_eq!(entry.scoreboard.player, 2);
        assert!(entry.final_expression.is_none());
    }

    #[test]
    fn start_request_serializes_null_name() {
        let body = serde_json::to_value(StartSessionRequest { player_name: None }).unwrap();
        assert_eq!(body, serde_json::json!({"player_name": null}));
    }
}
