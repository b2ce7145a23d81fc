//! Page-level game state and the events that drive it
//!
//! Background tasks never touch this directly; they send [`AppEvent`]s which
//! the UI thread applies once per frame.

use crate::constants::{EXPRESSION_HOLD_SECS, TOTAL_ROUNDS};
use crate::error::ApiError;
use crate::game::{self, RoundSlots};
use crate::types::*;
use tracing::{debug, info};

const RETRY_FALLBACK_MESSAGE: &str =
    "No clear gesture detected. Adjust lighting or hold your hand steadier.";

/// Results delivered from background tasks
#[derive(Debug)]
pub enum AppEvent {
    SessionStarted(Result<SessionStart, ApiError>),
    Countdown(Option<u32>),
    Capturing,
    RoundPlayed(Result<RoundResult, ApiError>),
    PhaseSynced(SessionStatus),
    ExpressionCaptured(Result<ExpressionResult, ApiError>),
    LogsLoaded(Result<Vec<SessionLogEntry>, ApiError>),
    PreviewPolled(Result<PreviewStatus, ApiError>),
    Health(Result<(), ApiError>),
}

/// Work the UI must kick off after applying an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Followup {
    RefreshLogs,
    SyncPhase(String),
    RestartStream,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendHealth {
    Unknown,
    Online,
    Offline,
}

pub struct GameState {
    pub session_id: Option<String>,
    pub rounds: RoundSlots,
    pub phase: SessionPhase,
    pub message: String,
    pub countdown: Option<u32>,
    pub expression: Option<ExpressionResult>,
    pub logs: Vec<SessionLogEntry>,
    pub is_working: bool,
    pub camera_reminder: bool,
    pub preview: PreviewStatus,
    pub preview_error: Option<String>,
    pub health: BackendHealth,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            session_id: None,
            rounds: RoundSlots::default(),
            phase: SessionPhase::Idle,
            message: String::new(),
            countdown: None,
            expression: None,
            logs: Vec::new(),
            is_working: false,
            camera_reminder: true,
            preview: PreviewStatus {
                gesture_label: Some("searching".into()),
                expression_label: Some("neutral".into()),
                timestamp: None,
            },
            preview_error: None,
            health: BackendHealth::Unknown,
        }
    }
}

impl GameState {
    pub fn scoreboard(&self) -> Scoreboard {
        self.rounds.scoreboard()
    }

    pub fn can_start(&self) -> bool {
        !self.is_working
    }

    pub fn can_play_round(&self) -> bool {
        game::can_play_round(&self.phase, self.is_working)
    }

    pub fn can_capture_expression(&self) -> bool {
        game::can_capture_expression(&self.phase, self.is_working)
    }

    pub fn gesture_label(&self) -> &str {
        self.preview.gesture_label.as_deref().unwrap_or("searching")
    }

    pub fn expression_label(&self) -> &str {
        self.preview.expression_label.as_deref().unwrap_or("neutral")
    }

    pub fn begin_start(&mut self) {
        self.is_working = true;
        self.message = "Setting up session...".into();
    }

    /// Returns the session to play, or sets a hint when there is none
    pub fn begin_round(&mut self) -> Option<String> {
        let Some(id) = self.session_id.clone() else {
            self.message = "Start a game session first.".into();
            return None;
        };
        self.is_working = true;
        self.message = "Countdown started. Show your gesture clearly!".into();
        Some(id)
    }

    pub fn begin_expression(&mut self) -> Option<String> {
        let Some(id) = self.session_id.clone() else {
            self.message = "No active session.".into();
            return None;
        };
        self.is_working = true;
        self.message = format!("Hold your face for {EXPRESSION_HOLD_SECS} seconds...");
        Some(id)
    }

    pub fn apply(&mut self, event: AppEvent) -> Vec<Followup> {
        match event {
            AppEvent::SessionStarted(result) => {
                self.is_working = false;
                match result {
                    Ok(start) => {
                        info!(session = %start.session_id, total_rounds = start.total_rounds, "Session started");
                        if start.total_rounds != TOTAL_ROUNDS {
                            debug!(
                                backend = start.total_rounds,
                                client = TOTAL_ROUNDS,
                                "Backend round count differs from client"
                            );
                        }
                        self.session_id = Some(start.session_id);
                        self.rounds.clear();
                        self.phase = start.status;
                        self.expression = None;
                        self.message = "Session started. Play round when ready.".into();
                        self.camera_reminder = false;
                        vec![Followup::RestartStream]
                    }
                    Err(e) => {
                        self.message = e.to_string();
                        vec![]
                    }
                }
            }
            AppEvent::Countdown(value) => {
                self.countdown = value;
                vec![]
            }
            AppEvent::Capturing => {
                self.message = "Capturing hand pose...".into();
                vec![]
            }
            AppEvent::RoundPlayed(result) => {
                self.is_working = false;
                self.countdown = None;
                match result {
                    Ok(round) => {
                        self.phase = round.status.clone();
                        if round.outcome == Outcome::Retry {
                            self.message = round
                                .message
                                .clone()
                                .unwrap_or_else(|| RETRY_FALLBACK_MESSAGE.to_string());
                            return vec![];
                        }
                        info!(
                            round = round.round_number,
                            player = %round.player_move,
                            bot = %round.bot_move,
                            outcome = ?round.outcome,
                            "Round recorded"
                        );
                        self.message = game::round_message(&round);
                        self.rounds.record(round);
                        vec![]
                    }
                    Err(e) => {
                        self.message = e.to_string();
                        self.session_id
                            .clone()
                            .map(Followup::SyncPhase)
                            .into_iter()
                            .collect()
                    }
                }
            }
            AppEvent::PhaseSynced(status) => {
                if self.session_id.as_deref() == Some(status.session_id.as_str()) {
                    debug!(phase = %status.status, rounds_played = status.rounds_played, "Phase resynchronized");
                    self.phase = status.status;
                }
                vec![]
            }
            AppEvent::ExpressionCaptured(result) => {
                self.is_working = false;
                match result {
                    Ok(expr) => {
                        info!(expression = %expr.expression, "Expression captured");
                        self.message =
                            format!("Expression captured: {}. Enjoy your cat!", expr.expression);
                        self.expression = Some(expr);
                        self.phase = SessionPhase::Completed;
                        vec![Followup::RefreshLogs]
                    }
                    Err(e) => {
                        self.message = e.to_string();
                        vec![]
                    }
                }
            }
            AppEvent::LogsLoaded(result) => {
                match result {
                    Ok(logs) => {
                        debug!(count = logs.len(), "Session logs loaded");
                        self.logs = logs;
                    }
                    Err(e) => self.message = e.to_string(),
                }
                vec![]
            }
            AppEvent::PreviewPolled(result) => {
                match result {
                    Ok(status) => {
                        self.preview = status;
                        self.preview_error = None;
                    }
                    Err(e) => self.preview_error = Some(e.to_string()),
                }
                vec![]
            }
            AppEvent::Health(result) => {
                self.health = if result.is_ok() {
                    BackendHealth::Online
                } else {
                    BackendHealth::Offline
                };
                vec![]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_ERROR_MESSAGE;
    use crate::game::tests::round;

    fn backend_error(message: &str) -> ApiError {
        ApiError::Backend {
            status: reqwest::StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn started() -> GameState {
        let mut state = GameState::default();
        state.begin_start();
        state.apply(AppEvent::SessionStarted(Ok(SessionStart {
            session_id: "s1".into(),
            total_rounds: TOTAL_ROUNDS,
            status: SessionPhase::Active,
        })));
        state
    }

    #[test]
    fn starting_resets_session_and_restarts_stream() {
        let mut state = started();
        state.rounds.record(round(1, Outcome::Player, SessionPhase::Active));

        state.begin_start();
        assert!(state.is_working);
        assert!(!state.can_start());
        let followups = state.apply(AppEvent::SessionStarted(Ok(SessionStart {
            session_id: "s2".into(),
            total_rounds: TOTAL_ROUNDS,
            status: SessionPhase::Active,
        })));

        assert_eq!(followups, vec![Followup::RestartStream]);
        assert_eq!(state.session_id.as_deref(), Some("s2"));
        assert_eq!(state.rounds.played(), 0);
        assert!(!state.camera_reminder);
        assert!(!state.is_working);
        assert_eq!(state.message, "Session started. Play round when ready.");
    }

    #[test]
    fn failed_start_shows_error() {
        let mut state = GameState::default();
        state.begin_start();
        state.apply(AppEvent::SessionStarted(Err(backend_error("boom"))));
        assert_eq!(state.message, "boom");
        assert!(!state.is_working);
        assert!(state.session_id.is_none());
        assert!(state.camera_reminder);
    }

    #[test]
    fn round_without_session_is_refused() {
        let mut state = GameState::default();
        assert_eq!(state.begin_round(), None);
        assert_eq!(state.message, "Start a game session first.");
        assert!(!state.is_working);

        assert_eq!(state.begin_expression(), None);
        assert_eq!(state.message, "No active session.");
    }

    #[test]
    fn countdown_then_recorded_round() {
        let mut state = started();
        assert_eq!(state.begin_round().as_deref(), Some("s1"));
        assert!(!state.can_play_round());

        state.apply(AppEvent::Countdown(Some(5)));
        assert_eq!(state.countdown, Some(5));
        state.apply(AppEvent::Countdown(None));
        state.apply(AppEvent::Capturing);
        assert_eq!(state.message, "Capturing hand pose...");

        state.apply(AppEvent::RoundPlayed(Ok(round(1, Outcome::Player, SessionPhase::Active))));
        assert!(state.can_play_round());
        assert_eq!(state.scoreboard().player, 1);
        assert_eq!(
            state.message,
            "Bot played scissors. Round 1 captured. Ready for the next one."
        );
    }

    #[test]
    fn retry_round_is_not_recorded() {
        let mut state = started();
        state.begin_round();
        let mut retry = round(1, Outcome::Retry, SessionPhase::Active);
        retry.message = Some("No clear gesture detected.".into());
        state.apply(AppEvent::RoundPlayed(Ok(retry)));

        assert_eq!(state.rounds.played(), 0);
        assert_eq!(state.message, "No clear gesture detected.");
        assert!(state.can_play_round());
    }

    #[test]
    fn last_round_enables_expression() {
        let mut state = started();
        for n in 1..=TOTAL_ROUNDS {
            state.begin_round();
            let phase = if n == TOTAL_ROUNDS {
                SessionPhase::NeedsExpression
            } else {
                SessionPhase::Active
            };
            state.apply(AppEvent::RoundPlayed(Ok(round(n, Outcome::Draw, phase))));
        }
        assert!(!state.can_play_round());
        assert!(state.can_capture_expression());
        assert_eq!(state.scoreboard().draws, TOTAL_ROUNDS as u32);
        assert!(state.message.starts_with("Bot chose scissors. All rounds done!"));
    }

    #[test]
    fn failed_round_requests_phase_sync() {
        let mut state = started();
        state.begin_round();
        let followups = state.apply(AppEvent::RoundPlayed(Err(backend_error(
            "All rounds played; capture expression",
        ))));
        assert_eq!(followups, vec![Followup::SyncPhase("s1".into())]);
        assert_eq!(state.message, "All rounds played; capture expression");
        assert!(!state.is_working);

        state.apply(AppEvent::PhaseSynced(SessionStatus {
            session_id: "s1".into(),
            status: SessionPhase::NeedsExpression,
            rounds_played: 3,
            total_rounds: 3,
        }));
        assert!(state.can_capture_expression());
    }

    #[test]
    fn stale_phase_sync_is_ignored() {
        let mut state = started();
        state.apply(AppEvent::PhaseSynced(SessionStatus {
            session_id: "other".into(),
            status: SessionPhase::Completed,
            rounds_played: 3,
            total_rounds: 3,
        }));
        assert_eq!(state.phase, SessionPhase::Active);
    }

    #[test]
    fn expression_completes_session_and_refreshes_logs() {
        let mut state = started();
        state.phase = SessionPhase::NeedsExpression;
        state.begin_expression();
        assert_eq!(state.message, "Hold your face for 4 seconds...");

        let followups = state.apply(AppEvent::ExpressionCaptured(Ok(ExpressionResult {
            session_id: "s1".into(),
            expression: "happy".into(),
            stats: Default::default(),
            cat_image_url: "/cats/happy.jpg".into(),
            session_summary: serde_json::Value::Null,
        })));
        assert_eq!(followups, vec![Followup::RefreshLogs]);
        assert_eq!(state.phase, SessionPhase::Completed);
        assert_eq!(state.message, "Expression captured: happy. Enjoy your cat!");
        assert!(!state.can_capture_expression());
    }

    #[test]
    fn preview_error_keeps_previous_labels() {
        let mut state = GameState::default();
        state.apply(AppEvent::PreviewPolled(Ok(PreviewStatus {
            gesture_label: Some("rock".into()),
            expression_label: None,
            timestamp: Some(1.0),
        })));
        assert_eq!(state.gesture_label(), "rock");
        assert_eq!(state.expression_label(), "neutral");

        state.apply(AppEvent::PreviewPolled(Err(backend_error("Could not access the webcam."))));
        assert_eq!(state.gesture_label(), "rock");
        assert_eq!(state.preview_error.as_deref(), Some("Could not access the webcam."));

        state.apply(AppEvent::PreviewPolled(Ok(PreviewStatus::default())));
        assert!(state.preview_error.is_none());
    }

    #[test]
    fn log_failure_sets_message() {
        let mut state = GameState::default();
        state.apply(AppEvent::LogsLoaded(Err(ApiError::InvalidBaseUrl("x".into()))));
        assert_eq!(state.message, "Invalid backend URL: x");

        state.apply(AppEvent::LogsLoaded(Err(backend_error(DEFAULT_ERROR_MESSAGE))));
        assert_eq!(state.message, DEFAULT_ERROR_MESSAGE);
    }

    #[test]
    fn health_tracks_reachability() {
        let mut state = GameState::default();
        assert_eq!(state.health, BackendHealth::Unknown);
        state.apply(AppEvent::Health(Ok(())));
        assert_eq!(state.health, BackendHealth::Online);
        state.apply(AppEvent::Health(Err(ApiError::InvalidBaseUrl("x".into()))));
        assert_eq!(state.health, BackendHealth::Offline);
    }
}
