//! Application constants and configuration

pub const APP_NAME: &str = "Vision RPS Client";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
/// Overrides the stored backend URL at startup
pub const API_BASE_URL_ENV: &str = "RPS_API_BASE_URL";

/// Keep in sync with the backend constant
pub const TOTAL_ROUNDS: usize = 3;
pub const MOVES: [&str; 3] = ["rock", "paper", "scissors"];

pub const PREVIEW_POLL_MS: u64 = 900;
pub const COUNTDOWN_SECS: u32 = 5;
pub const EXPRESSION_HOLD_SECS: u32 = 4;

pub const REQUEST_TIMEOUT_SECS: u64 = 120;
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_ERROR_MESSAGE: &str = "Something went wrong while talking to the backend.";
